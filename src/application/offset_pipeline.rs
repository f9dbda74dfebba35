//! Offset Resolution Pipeline - Main application use case
//!
//! Resolves a device's UTC offset through three tiers: the process cache,
//! the durable offset cache, and finally a fresh address → geocode →
//! timezone lookup. Fresh results are written back to both caches.

use crate::domain::entities::{DeviceIdentity, ResolvedOffset};
use crate::domain::errors::ResolveError;
use crate::domain::ports::{
    AddressResolver, GeocodeResolver, OffsetCache, ProcessCache, TimezoneResolver,
};
use crate::domain::value_objects::ResolutionSource;
use std::sync::Arc;

const MILLIS_PER_SECOND: i64 = 1_000;

/// Result of resolving a device's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetResolution {
    /// An offset to apply (possibly the UTC fallback).
    Resolved(ResolvedOffset),
    /// The user must grant address permission before local time can be known.
    PermissionRequired,
}

/// Offset resolution pipeline.
///
/// Every outbound call is awaited in sequence and never retried; the first
/// failure ends the attempt. Only a permission denial is reported to the
/// caller, every other failure degrades to offset 0 tagged `Default`.
pub struct OffsetResolutionPipeline {
    address_resolver: Arc<dyn AddressResolver>,
    geocoder: Arc<dyn GeocodeResolver>,
    timezone_resolver: Arc<dyn TimezoneResolver>,
    durable_cache: Arc<dyn OffsetCache>,
    process_cache: Arc<dyn ProcessCache>,
}

impl OffsetResolutionPipeline {
    /// Create a new pipeline.
    pub fn new(
        address_resolver: Arc<dyn AddressResolver>,
        geocoder: Arc<dyn GeocodeResolver>,
        timezone_resolver: Arc<dyn TimezoneResolver>,
        durable_cache: Arc<dyn OffsetCache>,
        process_cache: Arc<dyn ProcessCache>,
    ) -> Self {
        Self {
            address_resolver,
            geocoder,
            timezone_resolver,
            durable_cache,
            process_cache,
        }
    }

    /// Resolve the UTC offset for a device.
    ///
    /// # Arguments
    /// * `identity` - Device ID and credentials for the address lookup
    /// * `request_timestamp_millis` - UTC request time; DST is evaluated at this instant
    ///
    /// # Returns
    /// The offset and its source, or `PermissionRequired` when the address
    /// lookup was refused.
    pub async fn resolve_offset(
        &self,
        identity: &DeviceIdentity,
        request_timestamp_millis: i64,
    ) -> OffsetResolution {
        let device_id = identity.device_id.as_str();

        // 1. Process cache
        if let Some(offset_millis) = self.process_cache.get(device_id) {
            tracing::debug!(device_id = %device_id, offset_millis, "using process-cached offset");
            return OffsetResolution::Resolved(ResolvedOffset::new(
                offset_millis,
                ResolutionSource::ProcessCache,
            ));
        }

        // 2. Durable cache
        match self.durable_cache.get(device_id).await {
            Ok(Some(record)) => {
                tracing::info!(
                    device_id = %device_id,
                    offset_millis = record.offset_millis,
                    "device offset found in durable cache"
                );
                self.process_cache.insert(device_id, record.offset_millis);
                return OffsetResolution::Resolved(ResolvedOffset::new(
                    record.offset_millis,
                    ResolutionSource::DurableCache,
                ));
            }
            Ok(None) => {
                tracing::info!(device_id = %device_id, "device offset not found in durable cache");
            }
            Err(e) => {
                tracing::warn!(device_id = %device_id, error = %e, "durable cache lookup failed, using UTC");
                return OffsetResolution::Resolved(ResolvedOffset::fallback());
            }
        }

        // 3. Fresh resolution
        match self.resolve_fresh(identity, request_timestamp_millis).await {
            Ok(offset_millis) => {
                self.process_cache.insert(device_id, offset_millis);

                if let Err(e) = self.durable_cache.put(device_id, offset_millis).await {
                    tracing::error!(
                        device_id = %device_id,
                        error = %e,
                        "failed to store resolved offset"
                    );
                }

                OffsetResolution::Resolved(ResolvedOffset::new(
                    offset_millis,
                    ResolutionSource::Fresh,
                ))
            }
            Err(ResolveError::PermissionDenied) => {
                tracing::info!(device_id = %device_id, "address permission not granted");
                OffsetResolution::PermissionRequired
            }
            // 4. Anything else falls back to UTC
            Err(e) => {
                tracing::warn!(
                    device_id = %device_id,
                    error = %e,
                    "could not determine the device's local offset, using UTC"
                );
                OffsetResolution::Resolved(ResolvedOffset::fallback())
            }
        }
    }

    /// Run the address → geocode → timezone chain.
    async fn resolve_fresh(
        &self,
        identity: &DeviceIdentity,
        request_timestamp_millis: i64,
    ) -> Result<i64, ResolveError> {
        let address = self.address_resolver.resolve_address(identity).await?;
        tracing::info!(device_id = %identity.device_id, "resolved device address: {}", address);

        let coordinates = self.geocoder.geocode(&address).await?;

        // The timezone service takes seconds.
        let timestamp_seconds = request_timestamp_millis.div_euclid(MILLIS_PER_SECOND);
        let offset = self
            .timezone_resolver
            .resolve_offset(&coordinates, timestamp_seconds)
            .await?;

        tracing::info!(device_id = %identity.device_id, "resolved device offset: {}", offset);
        offset.total_millis().ok_or_else(|| {
            ResolveError::parse("timezone offset", format!("overflow in {}", offset))
        })
    }
}
