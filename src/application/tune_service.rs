//! Tune Service
//!
//! Turns a request into a playback decision: resolve the device offset,
//! shift the request time into local time, and classify it.

use crate::application::offset_pipeline::{OffsetResolution, OffsetResolutionPipeline};
use crate::domain::entities::{DeviceIdentity, PlaybackSelection, ResolvedLocalTime};
use crate::domain::services::TimeOfDayClassifier;
use crate::domain::value_objects::ResolutionSource;

/// Outcome of a tune request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuneOutcome {
    /// Play the selected hourly track.
    Play {
        local_time: ResolvedLocalTime,
        selection: PlaybackSelection,
        source: ResolutionSource,
    },
    /// Ask the user to grant address permission.
    PermissionRequired,
}

impl TuneOutcome {
    /// True when playback is based on UTC because local time was unavailable.
    pub fn local_time_unavailable(&self) -> bool {
        matches!(self, Self::Play { source, .. } if source.is_fallback())
    }
}

pub struct TuneService {
    pipeline: OffsetResolutionPipeline,
    debug_time_millis: Option<i64>,
}

impl TuneService {
    pub fn new(pipeline: OffsetResolutionPipeline) -> Self {
        Self {
            pipeline,
            debug_time_millis: None,
        }
    }

    /// Pin every request to a fixed UTC instant (for testing playback by hour).
    pub fn with_debug_time(mut self, debug_time_millis: Option<i64>) -> Self {
        self.debug_time_millis = debug_time_millis;
        self
    }

    /// Decide what to play for a request made at `request_timestamp_millis` (UTC).
    pub async fn select_tune(
        &self,
        identity: &DeviceIdentity,
        request_timestamp_millis: i64,
        resume_from_start: bool,
    ) -> TuneOutcome {
        let utc_millis = match self.debug_time_millis {
            Some(pinned) => {
                tracing::debug!("request time pinned to {} ms", pinned);
                pinned
            }
            None => request_timestamp_millis,
        };

        let resolved = match self.pipeline.resolve_offset(identity, utc_millis).await {
            OffsetResolution::Resolved(resolved) => resolved,
            OffsetResolution::PermissionRequired => return TuneOutcome::PermissionRequired,
        };

        let local_time = ResolvedLocalTime::new(utc_millis, resolved.offset_millis);
        let local_millis = local_time.local_timestamp_millis().unwrap_or_else(|| {
            tracing::warn!(
                utc_millis,
                offset_ms = resolved.offset_millis,
                "local time out of range, classifying the UTC instant"
            );
            utc_millis
        });
        let selection = TimeOfDayClassifier::classify(local_millis, resume_from_start);

        tracing::info!(
            device_id = %identity.device_id,
            source = %resolved.source,
            hour = selection.hour_bucket,
            offset_ms = selection.within_hour_offset_millis,
            "selected hourly tune"
        );

        TuneOutcome::Play {
            local_time,
            selection,
            source: resolved.source,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::adapters::outbound::DashMapProcessCache;
    use crate::domain::entities::{Address, Coordinates, OffsetRecord, UtcOffset};
    use crate::domain::errors::ResolveError;
    use crate::domain::ports::{AddressResolver, GeocodeResolver, OffsetCache, TimezoneResolver};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct StubResolvers {
        address: Result<Address, ResolveError>,
        offset: Result<UtcOffset, ResolveError>,
    }

    #[async_trait]
    impl AddressResolver for StubResolvers {
        async fn resolve_address(&self, _identity: &DeviceIdentity) -> Result<Address, ResolveError> {
            self.address.clone()
        }
    }

    #[async_trait]
    impl GeocodeResolver for StubResolvers {
        async fn geocode(&self, _address: &Address) -> Result<Coordinates, ResolveError> {
            Ok(Coordinates::new("35.68", "139.69"))
        }
    }

    #[async_trait]
    impl TimezoneResolver for StubResolvers {
        async fn resolve_offset(
            &self,
            _coordinates: &Coordinates,
            _timestamp_seconds: i64,
        ) -> Result<UtcOffset, ResolveError> {
            self.offset.clone()
        }
    }

    #[derive(Default)]
    struct MemoryOffsetCache {
        records: Mutex<HashMap<String, i64>>,
    }

    #[async_trait]
    impl OffsetCache for MemoryOffsetCache {
        async fn get(&self, device_id: &str) -> Result<Option<OffsetRecord>, ResolveError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(device_id)
                .map(|o| OffsetRecord::new(device_id, *o)))
        }

        async fn put(&self, device_id: &str, offset_millis: i64) -> Result<(), ResolveError> {
            self.records
                .lock()
                .unwrap()
                .insert(device_id.to_string(), offset_millis);
            Ok(())
        }
    }

    fn service(stubs: StubResolvers) -> TuneService {
        let stubs = Arc::new(stubs);
        TuneService::new(OffsetResolutionPipeline::new(
            stubs.clone(),
            stubs.clone(),
            stubs,
            Arc::new(MemoryOffsetCache::default()),
            Arc::new(DashMapProcessCache::new()),
        ))
    }

    fn tokyo() -> StubResolvers {
        StubResolvers {
            address: Ok(Address::new("JP", "100-0001")),
            offset: Ok(UtcOffset::new(32400, 0)),
        }
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("D1", "token", "https://api.fe.amazonalexa.com")
    }

    // 2024-03-10T06:45:00Z
    const UTC_0645: i64 = 1_710_053_100_000;

    #[tokio::test]
    async fn test_local_hour_uses_resolved_offset() {
        let outcome = service(tokyo()).select_tune(&identity(), UTC_0645, false).await;

        match outcome {
            TuneOutcome::Play {
                local_time,
                selection,
                source,
            } => {
                assert_eq!(local_time.offset_millis, 32_400_000);
                assert_eq!(selection.hour_bucket, 15);
                assert_eq!(selection.within_hour_offset_millis, 900_000);
                assert_eq!(source, ResolutionSource::Fresh);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!outcome.local_time_unavailable());
    }

    #[tokio::test]
    async fn test_fallback_plays_utc_hour() {
        let stubs = StubResolvers {
            address: Err(ResolveError::transport("Device Address API", "connection refused")),
            offset: Ok(UtcOffset::new(0, 0)),
        };
        let outcome = service(stubs).select_tune(&identity(), UTC_0645, false).await;

        match outcome {
            TuneOutcome::Play { selection, .. } => assert_eq!(selection.hour_bucket, 6),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(outcome.local_time_unavailable());
    }

    #[tokio::test]
    async fn test_permission_required() {
        let stubs = StubResolvers {
            address: Err(ResolveError::PermissionDenied),
            offset: Ok(UtcOffset::new(0, 0)),
        };
        let outcome = service(stubs).select_tune(&identity(), UTC_0645, false).await;

        assert_eq!(outcome, TuneOutcome::PermissionRequired);
        assert!(!outcome.local_time_unavailable());
    }

    #[tokio::test]
    async fn test_play_from_beginning() {
        let outcome = service(tokyo()).select_tune(&identity(), UTC_0645, true).await;

        match outcome {
            TuneOutcome::Play { selection, .. } => {
                assert_eq!(selection.within_hour_offset_millis, 0);
                assert!(selection.resume_from_start);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debug_time_overrides_request_time() {
        // 2024-03-10T00:10:00Z -> 09:10 in Tokyo
        let pinned = 1_710_029_400_000;
        let service = service(tokyo()).with_debug_time(Some(pinned));

        let outcome = service.select_tune(&identity(), UTC_0645, false).await;

        match outcome {
            TuneOutcome::Play {
                local_time,
                selection,
                ..
            } => {
                assert_eq!(local_time.utc_timestamp_millis, pinned);
                assert_eq!(selection.hour_bucket, 9);
                assert_eq!(selection.within_hour_offset_millis, 0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debug_time_at_end_of_range_does_not_panic() {
        let service = service(tokyo()).with_debug_time(Some(i64::MAX));

        let outcome = service.select_tune(&identity(), UTC_0645, false).await;

        match outcome {
            TuneOutcome::Play {
                local_time,
                selection,
                ..
            } => {
                assert_eq!(local_time.utc_timestamp_millis, i64::MAX);
                assert_eq!(local_time.local_timestamp_millis(), None);
                assert_eq!(selection.hour_bucket, 0);
                assert_eq!(selection.within_hour_offset_millis, 0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
