//! Pattern forecast: a predictor-free baseline.
//!
//! Starts from the latest reading and walks forward hour by hour with the
//! daily pattern, the trend of the recent window, a momentum term on the
//! drift from the starting value, jitter and occasional spikes.

use std::f64::consts::PI;

use crate::config::{CorrectionConfig, ModelConfig};
use crate::forecast::noise::NoiseSource;
use crate::forecast::trend::weighted_trend;
use crate::forecast::ForecastError;
use crate::types::{clamp_pm25, round_tenth, ForecastPoint, Observation};

/// Forecast `horizon` hours without the recurrent network.
pub fn pattern_forecast(
    history: &[Observation],
    horizon: usize,
    model: &ModelConfig,
    corrections: &CorrectionConfig,
    noise: &mut dyn NoiseSource,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let Some(last) = history.last() else {
        return Err(ForecastError::EmptyHistory);
    };
    if horizon == 0 {
        return Err(ForecastError::ZeroHorizon);
    }

    let c = corrections;
    let recent = &history[history.len().saturating_sub(model.window_length)..];
    // The recent window is fixed, so the trend term is the same every hour
    let trend = weighted_trend(recent, c.trend_weight);
    let current = last.pm25;
    let mut prev = current;
    let mut points = Vec::with_capacity(horizon);

    for step in 0..horizon {
        let hour = (last.hour() as usize + step + 1) % 24;
        let diurnal = ((hour as f64 - c.diurnal_phase_hours) / 24.0 * 2.0 * PI).sin()
            * c.diurnal_amplitude
            * c.diurnal_weight;
        let momentum = (prev - current) * c.baseline_momentum;

        let mut prediction = prev + diurnal + trend + momentum + noise.uniform(c.baseline_noise_amplitude);
        prediction += noise.spike(c.spike_probability, c.spike_max);
        prediction = clamp_pm25(prediction);

        let hours_ahead = i64::try_from(step + 1).unwrap_or(i64::MAX);
        points.push(ForecastPoint::new(last.successor(hours_ahead, prediction).timestamp, round_tenth(prediction)));
        prev = prediction;
    }

    Ok(points)
}
