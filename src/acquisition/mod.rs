//! Observation acquisition module
//!
//! Handles ingestion of PM2.5 readings from JSON sources. Everything past
//! this module receives validated, clamped, time-ordered observations.

pub mod json_source;

pub use json_source::{
    into_observations, load_observations, parse_observations, read_observations, IngestError, Reading,
};
