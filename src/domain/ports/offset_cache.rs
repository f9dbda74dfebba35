//! Offset Cache Ports
//!
//! Two tiers of offset caching: a durable table shared by every process
//! instance, and a per-process map owned by a long-lived handler.

use crate::domain::entities::OffsetRecord;
use crate::domain::errors::ResolveError;
use async_trait::async_trait;

/// Durable device-to-offset association.
///
/// One record per device; `put` overwrites. Concurrent writers for the
/// same device race and the last write wins.
#[async_trait]
pub trait OffsetCache: Send + Sync {
    /// Get the stored offset for a device, if one exists.
    async fn get(&self, device_id: &str) -> Result<Option<OffsetRecord>, ResolveError>;

    /// Create or replace the offset for a device.
    async fn put(&self, device_id: &str, offset_millis: i64) -> Result<(), ResolveError>;
}

/// In-memory offset cache for the lifetime of one process.
///
/// Entries never expire. Implementations must be safe to share between
/// overlapping requests.
pub trait ProcessCache: Send + Sync {
    fn get(&self, device_id: &str) -> Option<i64>;

    fn insert(&self, device_id: &str, offset_millis: i64);

    /// Number of cached devices.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
