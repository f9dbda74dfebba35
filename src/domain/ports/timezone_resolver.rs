//! Timezone Resolver Port

use crate::domain::entities::{Coordinates, UtcOffset};
use crate::domain::errors::ResolveError;
use async_trait::async_trait;

/// Resolver for coordinates at an instant to a UTC offset.
#[async_trait]
pub trait TimezoneResolver: Send + Sync {
    /// Look up the raw and daylight-saving offsets in effect at
    /// `timestamp_seconds` (seconds since the epoch, not millis).
    async fn resolve_offset(
        &self,
        coordinates: &Coordinates,
        timestamp_seconds: i64,
    ) -> Result<UtcOffset, ResolveError>;
}
