//! JSON Observation Source
//!
//! Accepts either a JSON array of readings or newline-delimited JSON (one
//! reading per line):
//!
//! ```text
//! [{"timestamp": "2024-06-01T00:00:00Z", "pm25": 18.4}, ...]
//! {"timestamp": "2024-06-01T01:00:00Z", "pm25": 21.0}
//! ```
//!
//! Readings must be finite and non-negative; accepted values are clamped to
//! the forecaster's valid range and sorted by timestamp.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{clamp_pm25, Observation};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read observations from {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to read observations: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid observation JSON (line {line}): {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid reading #{index}: {reason}")]
    InvalidReading { index: usize, reason: String },
}

/// Wire format of one reading.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
}

/// Parse observations from a JSON array or NDJSON text.
pub fn parse_observations(input: &str) -> Result<Vec<Observation>, IngestError> {
    let trimmed = input.trim_start();

    let readings: Vec<Reading> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|source| IngestError::Json {
            line: source.line(),
            source,
        })?
    } else {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|source| IngestError::Json { line: i + 1, source })
            })
            .collect::<Result<_, _>>()?
    };

    let observations = into_observations(readings)?;
    debug!(count = observations.len(), "Parsed observations");
    Ok(observations)
}

/// Validate, clamp and time-order already-decoded readings.
pub fn into_observations(readings: Vec<Reading>) -> Result<Vec<Observation>, IngestError> {
    let mut observations = readings
        .into_iter()
        .enumerate()
        .map(|(index, r)| validate_reading(index, r))
        .collect::<Result<Vec<_>, _>>()?;

    observations.sort_by_key(|o| o.timestamp);
    Ok(observations)
}

/// Read and parse observations from any reader (e.g. stdin).
pub fn read_observations<R: Read>(mut reader: R) -> Result<Vec<Observation>, IngestError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_observations(&buf)
}

/// Load observations from a file.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, IngestError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| IngestError::Io(path.to_path_buf(), e))?;
    let observations = parse_observations(&contents)?;
    info!(path = %path.display(), count = observations.len(), "Loaded observations");
    Ok(observations)
}

fn validate_reading(index: usize, reading: Reading) -> Result<Observation, IngestError> {
    if !reading.pm25.is_finite() {
        return Err(IngestError::InvalidReading {
            index,
            reason: format!("pm25 must be finite, got {}", reading.pm25),
        });
    }
    if reading.pm25 < 0.0 {
        return Err(IngestError::InvalidReading {
            index,
            reason: format!("pm25 cannot be negative, got {}", reading.pm25),
        });
    }
    Ok(Observation::new(reading.timestamp, clamp_pm25(reading.pm25)))
}
