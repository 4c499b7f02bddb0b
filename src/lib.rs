//! AQI Forecaster: PM2.5 forecasting and air-quality classification
//!
//! Hour-ahead PM2.5 forecasts from a gated recurrent network with fixed
//! random weights, corrected by a daily pattern, a recent trend and noise.
//!
//! ## Architecture
//!
//! - **GRU**: feature extraction, recurrent cell and two-layer network
//! - **Forecast**: autoregressive rollout, extended multi-day forecast, pattern baseline
//! - **AQI**: EPA breakpoint mapping and category bands
//! - **Advisory**: health recommendations for current and forecast AQI
//! - **Acquisition**: JSON observation ingestion
//! - **API**: HTTP service over the above

pub mod types;
pub mod aqi;
pub mod advisory;
pub mod gru;
pub mod config;
pub mod forecast;
pub mod acquisition;
pub mod api;

// Re-export configuration
pub use config::{ConfigError, ForecasterConfig};

// Re-export commonly used types
pub use types::{CalendarFields, ForecastPoint, Observation, PM25_MAX, PM25_MIN};

// Re-export AQI mapping
pub use aqi::{pm25_to_aqi, AqiCategory};
pub use advisory::HealthAdvisory;

// Re-export forecasting
pub use forecast::{
    daily_summaries, extended_forecast, pattern_forecast, ForecastError, ForecastStats, GruPredictor,
    NoNoise, NoiseSource, SeededNoise,
};

// Re-export ingestion
pub use acquisition::{load_observations, parse_observations, IngestError};
