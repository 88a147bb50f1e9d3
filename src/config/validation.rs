//! Config validation: unknown-key detection with Levenshtein suggestions
//! and regulatory range checks.
//!
//! Two-pass parse: the raw TOML is first walked as a `toml::Value` tree and
//! every key compared against the known field names, producing warnings with
//! "did you mean?" suggestions. Normal serde deserialization follows. Unknown
//! keys never fail a load.

use std::collections::HashSet;

use super::HosConfig;

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

/// Every valid dotted key path for `HosConfig`.
///
/// Kept in step with the struct hierarchy in hos_config.rs by hand.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [carrier]
        "carrier",
        "carrier.name",
        "carrier.time_zone",
        // [weekly]
        "weekly",
        "weekly.cycle_60_7",
        "weekly.cycle_70_8",
        "weekly.precedence",
        // [limits]
        "limits",
        "limits.weekly_60_hours",
        "limits.weekly_70_hours",
        "limits.driving_hours",
        "limits.on_duty_hours",
        "limits.break_after_driving_hours",
        "limits.break_hours",
        "limits.daily_reset_hours",
        "limits.restart_hours",
        "limits.restart_night_start_hour",
        "limits.restart_night_end_hour",
        "limits.restart_nights_required",
        // [thresholds]
        "thresholds",
        "thresholds.weekly_critical_margin_hours",
        "thresholds.break_warning_hours",
        "thresholds.at_risk_weekly_hours",
        "thresholds.at_risk_driving_hours",
        "thresholds.at_risk_on_duty_hours",
        // [fleet]
        "fleet",
        "fleet.limited_weekly_hours",
        "fleet.rest_required_weekly_hours",
        "fleet.rest_required_driving_hours",
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
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            if let Some((_, best_dist)) = best {
                if dist < best_dist {
                    best = Some((k, dist));
                }
            } else {
                best = Some((k, dist));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // serde reports parse errors
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Range Validation
// ============================================================================

/// Range checks on a parsed `HosConfig`.
///
/// Returns (errors, warnings). Errors are values the engine cannot evaluate
/// against; warnings are legal but unusual for a US carrier.
pub fn validate_ranges(config: &HosConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let l = &config.limits;

    if l.restart_night_end_hour > 23 || l.restart_night_start_hour >= l.restart_night_end_hour {
        errors.push(format!(
            "limits.restart_night_start_hour ({}) must be before restart_night_end_hour ({}) within 0-23",
            l.restart_night_start_hour, l.restart_night_end_hour
        ));
    }
    if l.restart_nights_required == 0 {
        errors.push("limits.restart_nights_required must be > 0".to_string());
    }
    if l.restart_hours.is_finite() && l.restart_hours > 24.0 * 7.0 {
        errors.push(format!(
            "limits.restart_hours = {:.1} is longer than a week",
            l.restart_hours
        ));
    }
    if config.server.addr.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "server.addr = '{}' is not a valid socket address",
            config.server.addr
        ));
    }

    let federal = [
        ("limits.weekly_60_hours", l.weekly_60_hours, 60.0),
        ("limits.weekly_70_hours", l.weekly_70_hours, 70.0),
        ("limits.driving_hours", l.driving_hours, 11.0),
        ("limits.on_duty_hours", l.on_duty_hours, 14.0),
    ];
    for (field, value, max) in federal {
        if value.is_finite() && value > max {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("{field} = {value:.1} is above the federal limit of {max:.1}"),
                suggestion: None,
            });
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
