//! Feature extraction and sequence building.
//!
//! Each observation maps to an 11-dimensional vector: normalized PM2.5,
//! sin/cos encodings of hour-of-day, day-of-week and day-of-month, a weekend
//! flag, and three rolling-statistic slots. The rolling slots are literal
//! placeholders (current value, current value, 0.1) rather than statistics
//! over neighbouring readings.

use crate::types::{CalendarFields, Observation};
use std::f64::consts::PI;

/// Number of GRU input features.
pub const NUM_FEATURES: usize = 11;

/// Feature names (matches extraction order).
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "pm25",
    "hour_sin", "hour_cos",
    "day_of_week_sin", "day_of_week_cos",
    "day_of_month_sin", "day_of_month_cos",
    "weekend",
    "rolling_mean_short", "rolling_mean_long", "rolling_std",
];

/// Scale applied to PM2.5 before it enters the network (and undone on output).
pub const PM25_SCALE: f64 = 100.0;

/// Constant written into the rolling-std slot.
const ROLLING_STD_PLACEHOLDER: f64 = 0.1;

/// One time step of network input.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Extract the feature vector for one observation and its calendar fields.
pub fn extract_features(observation: &Observation, calendar: CalendarFields) -> FeatureVector {
    let normalized = observation.pm25 / PM25_SCALE;
    let hour = f64::from(calendar.hour);
    let dow = f64::from(calendar.day_of_week);
    let dom = f64::from(calendar.day_of_month);

    [
        normalized,
        (2.0 * PI * hour / 24.0).sin(),
        (2.0 * PI * hour / 24.0).cos(),
        (2.0 * PI * dow / 7.0).sin(),
        (2.0 * PI * dow / 7.0).cos(),
        (2.0 * PI * dom / 30.0).sin(),
        (2.0 * PI * dom / 30.0).cos(),
        if calendar.is_weekend() { 1.0 } else { 0.0 },
        normalized,
        normalized,
        ROLLING_STD_PLACEHOLDER,
    ]
}

/// Build the input sequence from the most recent `window_length` observations.
///
/// Shorter histories yield shorter sequences; an empty window yields an
/// empty sequence.
pub fn build_sequence(window: &[Observation], window_length: usize) -> Vec<FeatureVector> {
    let start = window.len().saturating_sub(window_length);
    window[start..]
        .iter()
        .map(|obs| extract_features(obs, obs.calendar()))
        .collect()
}
