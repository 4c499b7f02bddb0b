//! Forecaster Configuration - model shape and forecast corrections as TOML values
//!
//! Each struct implements `Default` with the stock constants, so running
//! without a config file gives the reference behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "AQI_FORECASTER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "forecaster.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `ForecasterConfig::load()` which searches:
/// 1. `$AQI_FORECASTER_CONFIG`
/// 2. `./forecaster.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecasterConfig {
    /// Recurrent network shape
    #[serde(default)]
    pub model: ModelConfig,

    /// Pattern corrections applied in the forecast loop
    #[serde(default)]
    pub corrections: CorrectionConfig,

    /// Default horizons
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl ForecasterConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded forecaster config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./forecaster.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded forecaster config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Forecaster config saved");
        Ok(())
    }

    /// Validate every section.
    ///
    /// Rules:
    /// - Window length and unit counts must be > 0
    /// - Rates and probabilities must lie in their unit intervals
    /// - Correction magnitudes must be finite and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.model.range_errors();

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Model
// ============================================================================

/// Recurrent network shape.
///
/// `dropout_rate` and `learning_rate` are descriptive only: the network
/// runs inference on fixed random weights and never trains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Observations fed to the network per prediction
    #[serde(default = "default_window_length")]
    pub window_length: usize,

    /// Units in GRU layer 1 and layer 2
    #[serde(default = "default_hidden_units")]
    pub hidden_units: [usize; 2],

    #[serde(default = "default_dropout_rate")]
    pub dropout_rate: f64,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Weight seed. Absent = fresh random weights per predictor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_window_length() -> usize { 24 }
fn default_hidden_units() -> [usize; 2] { [64, 32] }
fn default_dropout_rate() -> f64 { 0.2 }
fn default_learning_rate() -> f64 { 0.001 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            window_length: default_window_length(),
            hidden_units: default_hidden_units(),
            dropout_rate: default_dropout_rate(),
            learning_rate: default_learning_rate(),
            seed: None,
        }
    }
}

impl ModelConfig {
    /// Model config with a fixed weight seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Shape errors that make a predictor impossible to build.
    pub fn range_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.window_length == 0 {
            errors.push("model.window_length must be > 0".to_string());
        }
        if self.hidden_units.iter().any(|&u| u == 0) {
            errors.push(format!(
                "model.hidden_units must both be > 0 (got {:?})",
                self.hidden_units
            ));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            errors.push(format!(
                "model.dropout_rate = {} must be in [0, 1)",
                self.dropout_rate
            ));
        }
        if !self.learning_rate.is_finite() {
            errors.push("model.learning_rate must be finite".to_string());
        }
        errors
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = self.range_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Corrections
// ============================================================================

/// Heuristic terms added to the raw network output each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Peak of the daily sine pattern (µg/m³)
    #[serde(default = "default_diurnal_amplitude")]
    pub diurnal_amplitude: f64,

    /// Fraction of the daily pattern applied
    #[serde(default = "default_diurnal_weight")]
    pub diurnal_weight: f64,

    /// Hour at which the daily pattern crosses zero going up
    #[serde(default = "default_diurnal_phase_hours")]
    pub diurnal_phase_hours: f64,

    /// Multiplier on (recent mean − older mean)
    #[serde(default = "default_trend_weight")]
    pub trend_weight: f64,

    /// Half-width of the uniform jitter (µg/m³)
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,

    /// Chance of a pollution spike per step
    #[serde(default = "default_spike_probability")]
    pub spike_probability: f64,

    /// Upper bound of spike magnitude (µg/m³)
    #[serde(default = "default_spike_max")]
    pub spike_max: f64,

    /// Pattern forecast: weight on drift from the current reading
    #[serde(default = "default_baseline_momentum")]
    pub baseline_momentum: f64,

    /// Pattern forecast: half-width of the uniform jitter
    #[serde(default = "default_baseline_noise_amplitude")]
    pub baseline_noise_amplitude: f64,
}

fn default_diurnal_amplitude() -> f64 { 8.0 }
fn default_diurnal_weight() -> f64 { 0.3 }
fn default_diurnal_phase_hours() -> f64 { 6.0 }
fn default_trend_weight() -> f64 { 0.1 }
fn default_noise_amplitude() -> f64 { 1.5 }
fn default_spike_probability() -> f64 { 0.08 }
fn default_spike_max() -> f64 { 20.0 }
fn default_baseline_momentum() -> f64 { 0.3 }
fn default_baseline_noise_amplitude() -> f64 { 2.5 }

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            diurnal_amplitude: default_diurnal_amplitude(),
            diurnal_weight: default_diurnal_weight(),
            diurnal_phase_hours: default_diurnal_phase_hours(),
            trend_weight: default_trend_weight(),
            noise_amplitude: default_noise_amplitude(),
            spike_probability: default_spike_probability(),
            spike_max: default_spike_max(),
            baseline_momentum: default_baseline_momentum(),
            baseline_noise_amplitude: default_baseline_noise_amplitude(),
        }
    }
}

// ============================================================================
// Forecast Horizons
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Hours predicted by a standard forecast
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: usize,

    /// Days predicted by an extended forecast
    #[serde(default = "default_extended_days")]
    pub extended_days: usize,
}

fn default_horizon_hours() -> usize { 24 }
fn default_extended_days() -> usize { 3 }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon_hours(),
            extended_days: default_extended_days(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_server_addr() }
    }
}
