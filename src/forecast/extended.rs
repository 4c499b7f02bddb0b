//! Multi-day forecast over a bounded rolling window.
//!
//! Unlike [`GruPredictor::forecast_points`], the working window never grows:
//! it starts as the last `window_length` observations and every predicted
//! hour pushes one synthetic observation in and drops the oldest.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

use crate::aqi::{pm25_to_aqi, AqiCategory};
use crate::forecast::noise::NoiseSource;
use crate::forecast::predictor::GruPredictor;
use crate::forecast::stats::ForecastStats;
use crate::forecast::ForecastError;
use crate::types::{round_tenth, ForecastPoint, Observation};

pub const HOURS_PER_DAY: usize = 24;

/// Forecast `days × 24` hours with one-step predictions on a rolling window.
pub fn extended_forecast(
    predictor: &GruPredictor,
    history: &[Observation],
    days: usize,
    noise: &mut dyn NoiseSource,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    if history.is_empty() {
        return Err(ForecastError::EmptyHistory);
    }
    if days == 0 {
        return Err(ForecastError::ZeroDays);
    }

    let window_length = predictor.window_length();
    let hours = days * HOURS_PER_DAY;
    let start = history.len().saturating_sub(window_length);
    let mut window: VecDeque<Observation> = history[start..].iter().copied().collect();
    let mut points = Vec::with_capacity(hours);

    for _ in 0..hours {
        let working = window.make_contiguous();
        let last = working[working.len() - 1];
        let value = round_tenth(predictor.rollout_step(working, &last, 0, noise));
        let next = last.successor(1, value);

        points.push(ForecastPoint::new(next.timestamp, value));
        window.push_back(next);
        window.pop_front();
    }

    info!(days, hours, window = window_length, "Extended forecast generated");
    Ok(points)
}

/// Aggregate of one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// 0 = first forecast day
    pub day: usize,
    /// Calendar date of the day's first hour
    pub date: NaiveDate,
    pub average_pm25: f64,
    pub min_pm25: f64,
    pub max_pm25: f64,
    pub average_aqi: u32,
    pub category: AqiCategory,
}

/// Split hourly points into consecutive 24-hour days (the last may be partial).
pub fn daily_summaries(points: &[ForecastPoint]) -> Vec<DailySummary> {
    points
        .chunks(HOURS_PER_DAY)
        .enumerate()
        .filter_map(|(day, chunk)| {
            let first = chunk.first()?;
            let values: Vec<f64> = chunk.iter().map(|p| p.pm25).collect();
            let stats = ForecastStats::from_values(&values)?;
            let average_aqi = pm25_to_aqi(stats.raw_average);

            Some(DailySummary {
                day,
                date: first.timestamp.date_naive(),
                average_pm25: round_tenth(stats.raw_average),
                min_pm25: stats.minimum,
                max_pm25: stats.peak,
                average_aqi,
                category: AqiCategory::from_aqi(average_aqi),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::forecast::noise::{NoNoise, SeededNoise};
    use crate::types::{PM25_MAX, PM25_MIN};
    use chrono::{Duration, TimeZone, Utc};

    fn history(n: usize) -> Vec<Observation> {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Observation::new(start + Duration::hours(i as i64), 30.0 + (i % 5) as f64))
            .collect()
    }

    #[test]
    fn test_extended_length_and_timestamps() {
        let predictor = GruPredictor::with_seed(42);
        let hist = history(48);
        let points = extended_forecast(&predictor, &hist, 3, &mut SeededNoise::from_seed(9)).unwrap();

        assert_eq!(points.len(), 72);
        let mut expected = hist[47].timestamp;
        for p in &points {
            expected += Duration::hours(1);
            assert_eq!(p.timestamp, expected);
            assert!((PM25_MIN..=PM25_MAX).contains(&p.pm25));
        }
    }

    #[test]
    fn test_extended_is_deterministic_without_noise() {
        let predictor = GruPredictor::with_seed(42);
        let hist = history(24);
        let a = extended_forecast(&predictor, &hist, 2, &mut NoNoise).unwrap();
        let b = extended_forecast(&predictor, &hist, 2, &mut NoNoise).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_hour_matches_single_step_forecast() {
        let predictor = GruPredictor::with_seed(7);
        let hist = history(24);
        let extended = extended_forecast(&predictor, &hist, 1, &mut NoNoise).unwrap();
        let single = predictor.forecast(&hist, 1, &mut NoNoise).unwrap();
        assert_eq!(extended[0].pm25, single[0]);
    }

    #[test]
    fn test_only_window_tail_matters() {
        // Older readings beyond the window do not change the result.
        let predictor = GruPredictor::from_parts(ModelConfig::seeded(3), Default::default()).unwrap();
        let long = history(60);
        let tail = long[36..].to_vec();
        let a = extended_forecast(&predictor, &long, 1, &mut NoNoise).unwrap();
        let b = extended_forecast(&predictor, &tail, 1, &mut NoNoise).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_zero_days() {
        let predictor = GruPredictor::with_seed(1);
        assert!(matches!(
            extended_forecast(&predictor, &history(5), 0, &mut NoNoise),
            Err(ForecastError::ZeroDays)
        ));
        assert!(matches!(
            extended_forecast(&predictor, &[], 1, &mut NoNoise),
            Err(ForecastError::EmptyHistory)
        ));
    }

    #[test]
    fn test_daily_summaries() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 1, 0, 0).unwrap();
        let points: Vec<ForecastPoint> = (0..30)
            .map(|i| {
                let pm25 = if i < 24 { 10.0 + (i % 2) as f64 * 4.0 } else { 40.0 };
                ForecastPoint::new(start + Duration::hours(i), pm25)
            })
            .collect();

        let days = daily_summaries(&points);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].day, 0);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(days[0].average_pm25, 12.0);
        assert_eq!(days[0].min_pm25, 10.0);
        assert_eq!(days[0].max_pm25, 14.0);
        assert_eq!(days[0].average_aqi, 50);
        assert_eq!(days[0].category, AqiCategory::Good);

        assert_eq!(days[1].average_pm25, 40.0);
        assert_eq!(days[1].category, AqiCategory::UnhealthyForSensitiveGroups);
    }
}
