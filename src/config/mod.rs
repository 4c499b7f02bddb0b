//! Forecaster Configuration Module
//!
//! Provides forecaster configuration loaded from TOML files. Every tuning
//! constant of the predictor and the forecast loop is a field here.
//!
//! ## Loading Order
//!
//! 1. `AQI_FORECASTER_CONFIG` environment variable (path to TOML file)
//! 2. `forecaster.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let config = ForecasterConfig::load();
//! let predictor = GruPredictor::new(&config)?;
//! ```

mod forecaster_config;
pub mod validation;

pub use forecaster_config::*;
