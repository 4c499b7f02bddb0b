//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use crate::forecast::trend::TREND_MIN_OBSERVATIONS;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ForecasterConfig.
///
/// Any new field added to ForecasterConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [model]
        "model",
        "model.window_length",
        "model.hidden_units",
        "model.dropout_rate",
        "model.learning_rate",
        "model.seed",
        // [corrections]
        "corrections",
        "corrections.diurnal_amplitude",
        "corrections.diurnal_weight",
        "corrections.diurnal_phase_hours",
        "corrections.trend_weight",
        "corrections.noise_amplitude",
        "corrections.spike_probability",
        "corrections.spike_max",
        "corrections.baseline_momentum",
        "corrections.baseline_noise_amplitude",
        // [forecast]
        "forecast",
        "forecast.horizon_hours",
        "forecast.extended_days",
        // [server]
        "server",
        "server.addr",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        // Tie-break on the key so the suggestion does not depend on hash order
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate numeric ranges on a parsed ForecasterConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are legal but probably unintended.
pub fn validate_ranges(config: &super::ForecasterConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let c = &config.corrections;
    let magnitudes = [
        ("corrections.diurnal_amplitude", c.diurnal_amplitude),
        ("corrections.diurnal_weight", c.diurnal_weight),
        ("corrections.noise_amplitude", c.noise_amplitude),
        ("corrections.spike_max", c.spike_max),
        ("corrections.baseline_momentum", c.baseline_momentum),
        ("corrections.baseline_noise_amplitude", c.baseline_noise_amplitude),
    ];
    for (name, value) in magnitudes {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{name} = {value} must be finite and >= 0"));
        }
    }

    if !c.trend_weight.is_finite() {
        errors.push("corrections.trend_weight must be finite".to_string());
    }
    if !c.diurnal_phase_hours.is_finite() {
        errors.push("corrections.diurnal_phase_hours must be finite".to_string());
    }
    if !(0.0..=1.0).contains(&c.spike_probability) {
        errors.push(format!(
            "corrections.spike_probability = {} must be in [0, 1]",
            c.spike_probability
        ));
    }

    if config.forecast.horizon_hours == 0 {
        errors.push("forecast.horizon_hours must be > 0".to_string());
    }
    if config.forecast.extended_days == 0 {
        errors.push("forecast.extended_days must be > 0".to_string());
    }

    // The extended forecast keeps only `window_length` observations, so a
    // short window never accumulates enough history for a trend term.
    let window = config.model.window_length;
    if window > 0 && window < TREND_MIN_OBSERVATIONS {
        warnings.push(ValidationWarning {
            field: "model.window_length".to_string(),
            message: format!(
                "window_length = {window} is below {TREND_MIN_OBSERVATIONS}; extended forecasts will never apply a trend"
            ),
            suggestion: None,
        });
    }

    if config.forecast.extended_days > 14 {
        warnings.push(ValidationWarning {
            field: "forecast.extended_days".to_string(),
            message: format!(
                "extended_days = {} is beyond the usual 1-14 day range",
                config.forecast.extended_days
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
