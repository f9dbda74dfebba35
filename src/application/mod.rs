//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod offset_pipeline;
mod tune_service;

pub use offset_pipeline::{OffsetResolution, OffsetResolutionPipeline};
pub use tune_service::{TuneOutcome, TuneService};
