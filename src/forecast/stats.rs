//! Summary statistics over forecasts and histories.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::types::{round_tenth, Observation};

/// Average, peak and minimum of a forecast, rounded to 0.1 µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastStats {
    pub average: f64,
    pub peak: f64,
    pub minimum: f64,
    #[serde(skip)]
    pub raw_average: f64,
}

impl ForecastStats {
    /// `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let raw_average = Statistics::mean(values.iter());
        Some(Self {
            average: round_tenth(raw_average),
            peak: round_tenth(Statistics::max(values.iter())),
            minimum: round_tenth(Statistics::min(values.iter())),
            raw_average,
        })
    }
}

/// Mean PM2.5 per hour of day (UTC), rounded to 0.1; 0 for hours without data.
pub fn hourly_averages(history: &[Observation]) -> [f64; 24] {
    let mut sums = [0.0_f64; 24];
    let mut counts = [0_u32; 24];

    for obs in history {
        let h = obs.hour() as usize;
        sums[h] += obs.pm25;
        counts[h] += 1;
    }

    let mut averages = [0.0; 24];
    for h in 0..24 {
        if counts[h] > 0 {
            averages[h] = round_tenth(sums[h] / f64::from(counts[h]));
        }
    }
    averages
}
