//! Short-term trend estimate: mean of the last 6 readings against the 6
//! before them.

use crate::types::Observation;

/// Readings per half of the comparison.
pub const TREND_HALF_WINDOW: usize = 6;

/// Readings needed before a trend is reported.
pub const TREND_MIN_OBSERVATIONS: usize = 2 * TREND_HALF_WINDOW;

/// Default multiplier on the mean difference.
pub const DEFAULT_TREND_WEIGHT: f64 = 0.1;

/// `(mean(last 6) − mean(previous 6)) × 0.1`, or 0 with fewer than 12 readings.
pub fn calculate_trend(data: &[Observation]) -> f64 {
    weighted_trend(data, DEFAULT_TREND_WEIGHT)
}

/// Same as [`calculate_trend`] with a custom multiplier.
pub fn weighted_trend(data: &[Observation], weight: f64) -> f64 {
    if data.len() < TREND_MIN_OBSERVATIONS {
        return 0.0;
    }

    let split = data.len() - TREND_HALF_WINDOW;
    let recent = &data[split..];
    let older = &data[split - TREND_HALF_WINDOW..split];

    (mean_pm25(recent) - mean_pm25(older)) * weight
}

fn mean_pm25(data: &[Observation]) -> f64 {
    data.iter().map(|o| o.pm25).sum::<f64>() / data.len() as f64
}
