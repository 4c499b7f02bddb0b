//! PM2.5 → AQI conversion and category bands.
//!
//! Piecewise-linear mapping over the PM2.5 breakpoint table, followed by a
//! category lookup: the first band (ascending) whose upper bound is at least
//! the AQI value. Bands cover `[0, ∞)` with no gaps.

use serde::{Deserialize, Serialize};

/// (upper pm25 bound, aqi at lower edge, pm25 at lower edge, aqi span, pm25 span)
const PM25_BREAKPOINTS: [(f64, f64, f64, f64, f64); 5] = [
    (12.0, 0.0, 0.0, 50.0, 12.0),
    (35.4, 50.0, 12.0, 50.0, 23.4),
    (55.4, 100.0, 35.4, 50.0, 20.0),
    (150.4, 150.0, 55.4, 50.0, 95.0),
    (250.4, 200.0, 150.4, 100.0, 100.0),
];

/// Segment used above the last breakpoint.
const HAZARDOUS_SEGMENT: (f64, f64, f64, f64) = (300.0, 250.4, 100.0, 99.6);

/// Convert a PM2.5 concentration (µg/m³) to an AQI value.
pub fn pm25_to_aqi(pm25: f64) -> u32 {
    let (base, lo, aqi_span, pm_span) = PM25_BREAKPOINTS
        .iter()
        .find(|(upper, ..)| pm25 <= *upper)
        .map_or(HAZARDOUS_SEGMENT, |&(_, base, lo, aqi_span, pm_span)| {
            (base, lo, aqi_span, pm_span)
        });

    // Negative inputs saturate to 0 on the cast
    (base + (pm25 - lo) * aqi_span / pm_span).round() as u32
}

/// AQI severity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// All categories in ascending severity.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Inclusive upper AQI bound of the band (`None` = unbounded).
    pub fn max_aqi(&self) -> Option<u32> {
        match self {
            AqiCategory::Good => Some(50),
            AqiCategory::Moderate => Some(100),
            AqiCategory::UnhealthyForSensitiveGroups => Some(150),
            AqiCategory::Unhealthy => Some(200),
            AqiCategory::VeryUnhealthy => Some(300),
            AqiCategory::Hazardous => None,
        }
    }

    /// Category for an AQI value.
    pub fn from_aqi(aqi: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.max_aqi().map_or(true, |max| aqi <= max))
            .unwrap_or(AqiCategory::Hazardous)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Display colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#4CAF50",
            AqiCategory::Moderate => "#FFC107",
            AqiCategory::UnhealthyForSensitiveGroups => "#FF9800",
            AqiCategory::Unhealthy => "#F44336",
            AqiCategory::VeryUnhealthy => "#9C27B0",
            AqiCategory::Hazardous => "#795548",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Category for a PM2.5 concentration.
pub fn pm25_category(pm25: f64) -> AqiCategory {
    AqiCategory::from_aqi(pm25_to_aqi(pm25))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_boundaries() {
        assert_eq!(pm25_to_aqi(0.0), 0);
        assert_eq!(pm25_to_aqi(12.0), 50);
        assert_eq!(pm25_to_aqi(35.4), 100);
        assert_eq!(pm25_to_aqi(55.4), 150);
        assert_eq!(pm25_to_aqi(150.4), 200);
        assert_eq!(pm25_to_aqi(250.4), 300);
    }

    #[test]
    fn test_interior_values() {
        // 25.0 → 50 + 13 * 50 / 23.4 = 77.78
        assert_eq!(pm25_to_aqi(25.0), 78);
        // 100.0 → 150 + 44.6 * 50 / 95 = 173.47
        assert_eq!(pm25_to_aqi(100.0), 173);
        // 350.0 → 300 + 99.6 * 100 / 99.6 = 400
        assert_eq!(pm25_to_aqi(350.0), 400);
    }

    #[test]
    fn test_aqi_monotonic_around_breakpoints() {
        let probes = [
            0.0, 11.9, 12.0, 12.1, 35.3, 35.4, 35.5, 55.3, 55.4, 55.5, 150.3, 150.4, 150.5,
            250.3, 250.4, 250.5, 400.0,
        ];
        for pair in probes.windows(2) {
            assert!(
                pm25_to_aqi(pair[0]) <= pm25_to_aqi(pair[1]),
                "AQI decreased between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_aqi_monotonic_dense_sweep() {
        let mut prev = pm25_to_aqi(0.0);
        for i in 1..=5000 {
            let aqi = pm25_to_aqi(f64::from(i) * 0.1);
            assert!(aqi >= prev, "AQI decreased at pm25={}", f64::from(i) * 0.1);
            prev = aqi;
        }
    }

    #[test]
    fn test_category_bands() {
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(101), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(150), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_aqi(1000), AqiCategory::Hazardous);
    }

    #[test]
    fn test_categories_partition_without_gaps() {
        let mut prev = AqiCategory::from_aqi(0);
        for aqi in 1..=600 {
            let cat = AqiCategory::from_aqi(aqi);
            assert!(cat >= prev, "category went backwards at AQI {aqi}");
            prev = cat;
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(AqiCategory::UnhealthyForSensitiveGroups.label(), "Unhealthy for Sensitive Groups");
        assert_eq!(pm25_category(41.0).to_string(), "Unhealthy for Sensitive Groups");
    }
}
