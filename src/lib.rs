//! tunes-clock Library
//!
//! Resolves a smart speaker's local time of day from its postal address and
//! picks the hourly track to play. Exposed as a library for the binary and
//! for integration tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{OffsetResolution, OffsetResolutionPipeline, TuneOutcome, TuneService};
pub use config::{load_config, Config};
pub use domain::entities::{
    Address, Coordinates, DeviceIdentity, OffsetRecord, PlaybackSelection, ResolvedLocalTime,
    ResolvedOffset, UtcOffset,
};
pub use domain::errors::ResolveError;
pub use domain::ports::{AddressResolver, GeocodeResolver, OffsetCache, ProcessCache, TimezoneResolver};
pub use domain::services::TimeOfDayClassifier;
pub use domain::value_objects::ResolutionSource;
