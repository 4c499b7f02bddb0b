//! PM2.5 forecasting.
//!
//! - `predictor`: GRU network + autoregressive hourly rollout
//! - `extended`: multi-day rollout on a bounded window, daily summaries
//! - `baseline`: pattern forecast without the network
//! - `trend`: recent-vs-older mean difference
//! - `noise`: randomness seam (seeded, disabled, fixed)
//! - `stats`: forecast statistics and hour-of-day profile

pub mod trend;
pub mod noise;
pub mod predictor;
pub mod extended;
pub mod baseline;
pub mod stats;

pub use baseline::pattern_forecast;
pub use extended::{daily_summaries, extended_forecast, DailySummary};
pub use noise::{FixedNoise, NoNoise, NoiseSource, SeededNoise};
pub use predictor::{GruPredictor, ModelSummary};
pub use stats::{hourly_averages, ForecastStats};
pub use trend::{calculate_trend, weighted_trend};

use thiserror::Error;

/// Contract violations on forecast inputs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Forecast requires at least one observation")]
    EmptyHistory,

    #[error("Forecast horizon must be at least one hour")]
    ZeroHorizon,

    #[error("Extended forecast must cover at least one day")]
    ZeroDays,
}
