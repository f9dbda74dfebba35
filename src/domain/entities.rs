//! Domain Entities - Core business objects
//!
//! These entities describe a device, where it is, and what its local time
//! means for playback. They have no external dependencies.

use crate::domain::value_objects::ResolutionSource;
use std::fmt;

const MILLIS_PER_SECOND: i64 = 1_000;

/// Identity of the device making a request.
///
/// Supplied by the voice platform on every request and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Opaque device identifier (cache key)
    pub device_id: String,
    /// Short-lived credential for the device settings API
    pub access_token: String,
    /// Base URL of the device settings API for this request's region
    pub api_endpoint: String,
}

impl DeviceIdentity {
    pub fn new(
        device_id: impl Into<String>,
        access_token: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            access_token: access_token.into(),
            api_endpoint: api_endpoint.into(),
        }
    }
}

/// Coarse postal address of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Country code (ISO 3166-1 alpha-2: US, DE, JP, etc)
    pub country_code: String,
    pub postal_code: String,
}

impl Address {
    pub fn new(country_code: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Query form used for geocoding: `"{country},{postal}"` (not yet URL-encoded).
    pub fn to_query(&self) -> String {
        format!("{},{}", self.country_code, self.postal_code)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.country_code, self.postal_code)
    }
}

/// Latitude/longitude pair, kept as the decimal text the geocoder returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// `lat,lng` form used by the timezone lookup.
    pub fn to_location(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// UTC offset of a location at a given instant, as reported by the timezone service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset {
    /// Standard offset from UTC in seconds
    pub raw_offset_seconds: i64,
    /// Daylight-saving adjustment in seconds (0 outside DST)
    pub dst_offset_seconds: i64,
}

impl UtcOffset {
    pub fn new(raw_offset_seconds: i64, dst_offset_seconds: i64) -> Self {
        Self {
            raw_offset_seconds,
            dst_offset_seconds,
        }
    }

    /// Total offset (raw + DST) in milliseconds, or `None` on overflow.
    pub fn total_millis(&self) -> Option<i64> {
        self.raw_offset_seconds
            .checked_add(self.dst_offset_seconds)?
            .checked_mul(MILLIS_PER_SECOND)
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "raw={}s dst={}s",
            self.raw_offset_seconds, self.dst_offset_seconds
        )?;
        match self.total_millis() {
            Some(total) => write!(f, " total={}ms", total),
            None => write!(f, " total=overflow"),
        }
    }
}

/// Durable cache entry: the total offset last resolved for a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetRecord {
    pub device_id: String,
    pub offset_millis: i64,
}

impl OffsetRecord {
    pub fn new(device_id: impl Into<String>, offset_millis: i64) -> Self {
        Self {
            device_id: device_id.into(),
            offset_millis,
        }
    }
}

/// An offset together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOffset {
    pub offset_millis: i64,
    pub source: ResolutionSource,
}

impl ResolvedOffset {
    pub fn new(offset_millis: i64, source: ResolutionSource) -> Self {
        Self {
            offset_millis,
            source,
        }
    }

    /// Fallback used when the device's local time cannot be determined.
    pub fn fallback() -> Self {
        Self::new(0, ResolutionSource::Default)
    }
}

/// A UTC instant paired with the device's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLocalTime {
    pub utc_timestamp_millis: i64,
    pub offset_millis: i64,
}

impl ResolvedLocalTime {
    pub fn new(utc_timestamp_millis: i64, offset_millis: i64) -> Self {
        Self {
            utc_timestamp_millis,
            offset_millis,
        }
    }

    /// Local wall-clock time expressed as milliseconds since the epoch.
    ///
    /// `None` when the shifted instant does not fit in an `i64`.
    pub fn local_timestamp_millis(&self) -> Option<i64> {
        self.utc_timestamp_millis.checked_add(self.offset_millis)
    }
}

/// What to play: the hour's track and where in it to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSelection {
    /// Local hour of day, 0-23
    pub hour_bucket: u8,
    /// Position within the hour's track to resume from
    pub within_hour_offset_millis: i64,
    /// Whether the caller asked to start the track from the beginning
    pub resume_from_start: bool,
}
