//! Shared data structures for PM2.5 forecasting
//!
//! This module defines the core types that flow through the forecaster:
//! - Observation: one timestamped PM2.5 reading (real or synthetic)
//! - ForecastPoint: one predicted hour with its derived AQI
//! - Range constants shared by ingestion, the network and the forecast loop

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::aqi::{pm25_to_aqi, AqiCategory};

// ============================================================================
// Valid PM2.5 Range
// ============================================================================

/// Lowest PM2.5 value (µg/m³) the forecaster will emit or accept.
pub const PM25_MIN: f64 = 5.0;

/// Highest PM2.5 value (µg/m³) the forecaster will emit or accept.
pub const PM25_MAX: f64 = 250.0;

/// Clamp a PM2.5 value into `[PM25_MIN, PM25_MAX]`.
#[inline]
pub fn clamp_pm25(value: f64) -> f64 {
    value.clamp(PM25_MIN, PM25_MAX)
}

/// Round to one decimal place (the precision forecasts are reported at).
#[inline]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// Observation
// ============================================================================

/// One PM2.5 reading at an instant in time.
///
/// Observations are immutable once built; windows of them are kept in
/// ascending timestamp order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, pm25: f64) -> Self {
        Self { timestamp, pm25 }
    }

    /// Build the synthetic observation that follows this one by `hours`.
    pub fn successor(&self, hours: i64, pm25: f64) -> Self {
        Self {
            timestamp: self.timestamp + Duration::hours(hours),
            pm25,
        }
    }

    /// Calendar decomposition used by feature extraction.
    pub fn calendar(&self) -> CalendarFields {
        CalendarFields {
            hour: self.timestamp.hour(),
            day_of_week: self.timestamp.weekday().num_days_from_sunday(),
            day_of_month: self.timestamp.day(),
        }
    }

    /// Hour of day (0-23, UTC).
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Calendar fields of a timestamp.
///
/// `day_of_week` counts from Sunday = 0 so that 0 and 6 are the weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub hour: u32,
    pub day_of_week: u32,
    pub day_of_month: u32,
}

impl CalendarFields {
    pub fn is_weekend(&self) -> bool {
        self.day_of_week == 0 || self.day_of_week == 6
    }
}

// ============================================================================
// Forecast Output
// ============================================================================

/// One predicted hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub aqi: u32,
    pub category: AqiCategory,
}

impl ForecastPoint {
    pub fn new(timestamp: DateTime<Utc>, pm25: f64) -> Self {
        let aqi = pm25_to_aqi(pm25);
        Self {
            timestamp,
            pm25,
            aqi,
            category: AqiCategory::from_aqi(aqi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clamp_pm25() {
        assert_eq!(clamp_pm25(-3.0), PM25_MIN);
        assert_eq!(clamp_pm25(42.0), 42.0);
        assert_eq!(clamp_pm25(999.0), PM25_MAX);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(12.34), 12.3);
        assert_eq!(round_tenth(12.36), 12.4);
        assert_eq!(round_tenth(5.0), 5.0);
    }

    #[test]
    fn test_calendar_fields() {
        // 2024-06-01 was a Saturday
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 17, 30, 0).unwrap();
        let cal = Observation::new(ts, 20.0).calendar();
        assert_eq!(cal.hour, 17);
        assert_eq!(cal.day_of_week, 6);
        assert_eq!(cal.day_of_month, 1);
        assert!(cal.is_weekend());
    }

    #[test]
    fn test_successor_advances_hours() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();
        let next = Observation::new(ts, 20.0).successor(1, 30.0);
        assert_eq!(next.timestamp, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(next.pm25, 30.0);
    }

    #[test]
    fn test_forecast_point_derives_aqi() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let p = ForecastPoint::new(ts, 12.0);
        assert_eq!(p.aqi, 50);
        assert_eq!(p.category, AqiCategory::Good);
    }
}
