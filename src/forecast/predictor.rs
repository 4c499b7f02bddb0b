//! GRU predictor: the network plus the autoregressive rollout.
//!
//! Each forecast works on its own copy of the history. Every step:
//!
//! 1. Build the feature sequence from the last `window_length` observations
//! 2. Run the network for a raw prediction
//! 3. Add the daily pattern, the trend term, jitter and (rarely) a spike
//! 4. Clamp to [5, 250] and record the value rounded to 0.1 µg/m³
//! 5. Append a synthetic observation one hour after the last one
//!
//! The working copy grows by one entry per step; only its tail is read.

use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, info};

use crate::config::{ConfigError, CorrectionConfig, ForecasterConfig, ModelConfig};
use crate::forecast::noise::NoiseSource;
use crate::forecast::trend::weighted_trend;
use crate::forecast::ForecastError;
use crate::gru::{build_sequence, GruNetwork, FEATURE_NAMES, NUM_FEATURES};
use crate::types::{clamp_pm25, round_tenth, ForecastPoint, Observation};

/// Forecasting model with fixed weights.
///
/// Holds no mutable state; share it freely (`Arc<GruPredictor>`) across
/// threads or tasks.
#[derive(Debug, Clone)]
pub struct GruPredictor {
    model: ModelConfig,
    corrections: CorrectionConfig,
    network: GruNetwork,
    seed: u64,
}

impl GruPredictor {
    /// Build a predictor from a validated configuration.
    ///
    /// Weights come from `model.seed`, or a random seed when unset.
    pub fn new(config: &ForecasterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::from_parts(config.model.clone(), config.corrections.clone())
    }

    pub fn from_parts(model: ModelConfig, corrections: CorrectionConfig) -> Result<Self, ConfigError> {
        model.validate()?;
        let seed = model.seed.unwrap_or_else(rand::random);
        let network = GruNetwork::new(model.hidden_units, seed);

        info!(
            window = model.window_length,
            units = ?model.hidden_units,
            params = network.num_params(),
            seed,
            "GRU predictor initialized"
        );

        Ok(Self { model, corrections, network, seed })
    }

    /// Predictor with default settings and a fixed weight seed.
    pub fn with_seed(seed: u64) -> Self {
        let model = ModelConfig::seeded(seed);
        let network = GruNetwork::new(model.hidden_units, seed);
        Self {
            model,
            corrections: CorrectionConfig::default(),
            network,
            seed,
        }
    }

    /// Swap in explicit network weights (shape must match the config).
    pub fn with_network(mut self, network: GruNetwork) -> Self {
        self.model.hidden_units = network.hidden_units();
        self.network = network;
        self
    }

    pub fn window_length(&self) -> usize {
        self.model.window_length
    }

    pub fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    pub fn corrections(&self) -> &CorrectionConfig {
        &self.corrections
    }

    pub fn network(&self) -> &GruNetwork {
        &self.network
    }

    /// Seed the weights were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw network prediction for the tail of `window` (no corrections).
    pub fn predict_raw(&self, window: &[Observation]) -> f64 {
        self.network.forward(&build_sequence(window, self.model.window_length))
    }

    /// Daily-pattern term for a given hour of day.
    pub fn diurnal_adjustment(&self, hour: u32) -> f64 {
        let c = &self.corrections;
        ((f64::from(hour) - c.diurnal_phase_hours) / 24.0 * 2.0 * PI).sin()
            * c.diurnal_amplitude
            * c.diurnal_weight
    }

    /// One corrected rollout step on a non-empty working copy.
    ///
    /// `step` is the 0-based position in the rollout; the target hour is
    /// `(hour of last observation + step + 1) mod 24`. Returns the clamped,
    /// unrounded prediction.
    pub(crate) fn rollout_step(
        &self,
        working: &[Observation],
        last: &Observation,
        step: usize,
        noise: &mut dyn NoiseSource,
    ) -> f64 {
        let c = &self.corrections;
        let base = self.predict_raw(working);

        let hour = ((last.hour() as usize + step + 1) % 24) as u32;
        let diurnal = self.diurnal_adjustment(hour);
        let trend = weighted_trend(working, c.trend_weight);
        let jitter = noise.uniform(c.noise_amplitude);
        let spike = noise.spike(c.spike_probability, c.spike_max);

        debug!(step, hour, base, diurnal, trend, jitter, spike, "rollout step");

        clamp_pm25(base + diurnal + trend + jitter + spike)
    }

    /// Forecast `horizon` hourly PM2.5 values after the end of `history`.
    pub fn forecast(
        &self,
        history: &[Observation],
        horizon: usize,
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<f64>, ForecastError> {
        Ok(self
            .forecast_points(history, horizon, noise)?
            .into_iter()
            .map(|p| p.pm25)
            .collect())
    }

    /// Forecast with timestamps and AQI for every hour.
    pub fn forecast_points(
        &self,
        history: &[Observation],
        horizon: usize,
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        if history.is_empty() {
            return Err(ForecastError::EmptyHistory);
        }
        if horizon == 0 {
            return Err(ForecastError::ZeroHorizon);
        }

        let mut working = Vec::with_capacity(history.len() + horizon);
        working.extend_from_slice(history);
        let mut points = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let last = working[working.len() - 1];
            let prediction = self.rollout_step(&working, &last, step, noise);
            let next = last.successor(1, prediction);

            points.push(ForecastPoint::new(next.timestamp, round_tenth(prediction)));
            working.push(next);
        }

        info!(horizon, history = history.len(), "Forecast generated");
        Ok(points)
    }

    /// Architecture description.
    pub fn summary(&self) -> ModelSummary {
        let [units1, units2] = self.network.hidden_units();
        let dropout = self.model.dropout_rate;
        ModelSummary {
            architecture: "GRU Neural Network",
            layers: vec![
                format!("Input Layer: {} timesteps × {} features", self.model.window_length, NUM_FEATURES),
                format!("GRU Layer 1: {units1} units"),
                format!("Dropout: {dropout}"),
                format!("GRU Layer 2: {units2} units (single step on final layer-1 state)"),
                format!("Dropout: {dropout}"),
                "Output Layer: 1 unit (PM2.5 prediction)".to_string(),
            ],
            window_length: self.model.window_length,
            input_features: NUM_FEATURES,
            feature_names: FEATURE_NAMES.to_vec(),
            hidden_units: [units1, units2],
            dropout_rate: dropout,
            learning_rate: self.model.learning_rate,
            parameters: self.network.num_params(),
            seed: self.seed,
            trained: false,
        }
    }
}

/// Model description for display and the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub architecture: &'static str,
    pub layers: Vec<String>,
    pub window_length: usize,
    pub input_features: usize,
    pub feature_names: Vec<&'static str>,
    pub hidden_units: [usize; 2],
    pub dropout_rate: f64,
    pub learning_rate: f64,
    pub parameters: usize,
    pub seed: u64,
    /// Always false: weights are never fit to data.
    pub trained: bool,
}
