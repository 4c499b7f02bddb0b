//! Health advisory derived from current and forecast AQI.
//!
//! The advisory is driven by the worse of the current AQI and the rounded
//! average of the forecast AQIs.

use serde::Serialize;

use crate::aqi::AqiCategory;

/// Health advisory for the current reading and the forecast window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAdvisory {
    pub current_aqi: u32,
    pub current_category: AqiCategory,
    /// Rounded mean of the forecast AQIs (equals `current_aqi` when no forecast is given).
    pub forecast_average_aqi: u32,
    pub forecast_category: AqiCategory,
    /// AQI the recommendations were chosen for.
    pub governing_aqi: u32,
    pub recommended_actions: Vec<&'static str>,
    pub vulnerable_groups: Vec<&'static str>,
}

impl HealthAdvisory {
    pub fn assess(current_aqi: u32, forecast_aqis: &[u32]) -> Self {
        let forecast_average_aqi = if forecast_aqis.is_empty() {
            current_aqi
        } else {
            let sum: f64 = forecast_aqis.iter().map(|&a| f64::from(a)).sum();
            (sum / forecast_aqis.len() as f64).round() as u32
        };
        let governing_aqi = current_aqi.max(forecast_average_aqi);

        Self {
            current_aqi,
            current_category: AqiCategory::from_aqi(current_aqi),
            forecast_average_aqi,
            forecast_category: AqiCategory::from_aqi(forecast_average_aqi),
            governing_aqi,
            recommended_actions: recommended_actions(governing_aqi),
            vulnerable_groups: vulnerable_groups(governing_aqi),
        }
    }
}

/// Recommended actions for an AQI level.
pub fn recommended_actions(aqi: u32) -> Vec<&'static str> {
    match AqiCategory::from_aqi(aqi) {
        AqiCategory::Good => vec![
            "Air quality is good - ideal for outdoor activities",
            "No restrictions on outdoor exercise",
            "Perfect time for outdoor events and gatherings",
        ],
        AqiCategory::Moderate => vec![
            "Unusually sensitive people should limit prolonged outdoor exertion",
            "Consider reducing intense outdoor activities",
            "Monitor air quality if planning extended outdoor exposure",
        ],
        AqiCategory::UnhealthyForSensitiveGroups => vec![
            "Sensitive groups should reduce prolonged outdoor exertion",
            "General public should limit intense outdoor activities",
            "Close windows to prevent outdoor air from entering",
            "Use air purifiers indoors",
        ],
        AqiCategory::Unhealthy => vec![
            "Everyone should avoid prolonged outdoor exertion",
            "Sensitive groups should avoid all outdoor activities",
            "Wear N95 masks if outdoor exposure is necessary",
            "Keep indoor air clean with purifiers",
            "Reschedule outdoor events if possible",
        ],
        AqiCategory::VeryUnhealthy => vec![
            "Everyone should avoid all outdoor physical activities",
            "Stay indoors with windows and doors closed",
            "Use high-efficiency air purifiers",
            "Sensitive groups should remain indoors",
            "Emergency measures may be necessary",
        ],
        AqiCategory::Hazardous => vec![
            "Health alert: Everyone should avoid all outdoor activities",
            "Remain indoors with air purification systems",
            "Seek medical attention if experiencing symptoms",
            "Follow emergency protocols",
            "Consider evacuation if conditions persist",
        ],
    }
}

/// Population groups at risk for an AQI level. Grows with severity.
pub fn vulnerable_groups(aqi: u32) -> Vec<&'static str> {
    let mut groups = vec![
        "Children and teenagers",
        "Older adults (65+)",
        "People with heart or lung disease",
        "People with asthma",
    ];

    if aqi > 100 {
        groups.push("Pregnant women");
        groups.push("People with diabetes");
    }
    if aqi > 150 {
        groups.push("Outdoor workers");
        groups.push("Athletes and active individuals");
    }
    if aqi > 200 {
        groups.push("All individuals (general population)");
    }

    groups
}
