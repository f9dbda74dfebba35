//! DashMap Process Cache
//!
//! Implements ProcessCache using DashMap for lock-free concurrent access.

use crate::domain::ports::ProcessCache;
use dashmap::DashMap;
use std::sync::Arc;

/// DashMap-backed per-process offset cache.
///
/// Owned by the long-lived handler and injected into the pipeline.
/// Entries live until the process exits.
#[derive(Clone, Default)]
pub struct DashMapProcessCache {
    offsets: Arc<DashMap<String, i64>>,
}

impl DashMapProcessCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessCache for DashMapProcessCache {
    fn get(&self, device_id: &str) -> Option<i64> {
        self.offsets.get(device_id).map(|e| *e.value())
    }

    fn insert(&self, device_id: &str, offset_millis: i64) {
        self.offsets.insert(device_id.to_string(), offset_millis);
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }
}
