//! Time-of-Day Classifier
//!
//! Pure domain logic for picking the hourly track and the resume point
//! within it. This service performs no I/O.
//!
//! Timestamps are already shifted to the device's local time, so all
//! calendar arithmetic is plain proleptic-Gregorian UTC arithmetic and
//! does not depend on the host's locale or timezone.

use crate::domain::entities::PlaybackSelection;
use chrono::{DateTime, Timelike, Utc};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// Minutes into the hour after which playback resumes mid-track.
const RESUME_THRESHOLD_MINUTES: i64 = 30;

/// Classifies a local timestamp into a playback selection.
///
/// Each hour has its own track. During the first half hour the track
/// always starts from the beginning; past the half-hour mark playback
/// resumes `minute:second - 30:00` into the track.
pub struct TimeOfDayClassifier;

impl TimeOfDayClassifier {
    /// Classify a local timestamp (epoch millis, offset already applied).
    ///
    /// When `resume_from_start` is set the within-hour offset is forced to 0.
    /// A timestamp outside the calendar's range plays midnight's track from
    /// the start.
    pub fn classify(local_timestamp_millis: i64, resume_from_start: bool) -> PlaybackSelection {
        let (hour, minute, second) = Self::clock(local_timestamp_millis).unwrap_or_else(|| {
            tracing::warn!(
                "timestamp {} ms is outside the calendar range, using midnight",
                local_timestamp_millis
            );
            (0, 0, 0)
        });

        tracing::debug!(
            "local time (hh:mm:ss): {:02}:{:02}:{:02} ({} ms)",
            hour,
            minute,
            second,
            local_timestamp_millis
        );

        let within_hour_offset_millis = if resume_from_start {
            0
        } else {
            Self::resume_offset(i64::from(minute), i64::from(second))
        };

        PlaybackSelection {
            hour_bucket: hour as u8,
            within_hour_offset_millis,
            resume_from_start,
        }
    }

    /// Hour (0-23), minute and second of a timestamp's day, in UTC.
    ///
    /// `None` when the timestamp is outside the range chrono can represent.
    pub fn clock(timestamp_millis: i64) -> Option<(u32, u32, u32)> {
        let time = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)?;
        Some((time.hour(), time.minute(), time.second()))
    }

    /// Resume point within the hour's track.
    ///
    /// Only the minute is compared against the threshold, so anything up to
    /// `HH:30:59` restarts the track.
    fn resume_offset(minute: i64, second: i64) -> i64 {
        if minute <= RESUME_THRESHOLD_MINUTES {
            return 0;
        }

        let elapsed = minute * MILLIS_PER_MINUTE + second * MILLIS_PER_SECOND;
        let offset = RESUME_THRESHOLD_MINUTES * MILLIS_PER_MINUTE - (MILLIS_PER_HOUR - elapsed);

        tracing::debug!(
            "resume offset: {} minutes ({}ms)",
            offset / MILLIS_PER_MINUTE,
            offset
        );

        offset
    }

    /// 12-hour label for an hour bucket, e.g. `03:00 PM`.
    pub fn hour_label(hour_bucket: u8) -> String {
        let hour = hour_bucket % 24;
        let suffix = if hour < 12 { "AM" } else { "PM" };
        let twelve = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{:02}:00 {}", twelve, suffix)
    }
}
