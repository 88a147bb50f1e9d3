//! Carrier configuration - HOS limits and dashboard thresholds as TOML values
//!
//! Every section implements `Default` with the federal property-carrying
//! values, so a missing file or section changes nothing. The file is expressed
//! in hours; `policy()` converts it once into the minute-based `PolicyWindow`
//! the engine consumes.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_SERVER_ADDR, DEFAULT_TIME_ZONE};
use crate::hos::{hours_to_minutes, AdvisoryThresholds, HosError, PolicyWindow};
use crate::types::WeeklyCycle;

// ============================================================================
// Config Provenance
// ============================================================================

/// Dotted key paths explicitly present in the user's TOML file.
///
/// Every `#[serde(default)]` field has a value after parsing; this keeps the
/// distinction between user choices and built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    /// Example: `provenance.is_user_set("weekly.cycle_70_8")`
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one carrier deployment.
///
/// Load with `HosConfig::load()` which searches:
/// 1. `$HOS_CONFIG` env var
/// 2. `./hos_config.toml`
/// 3. Built-in defaults when no file exists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HosConfig {
    #[serde(default)]
    pub carrier: CarrierInfo,

    /// 60/7 vs 70/8 selection
    #[serde(default)]
    pub weekly: WeeklyConfig,

    /// Regulatory limits (hours)
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Dashboard advisory thresholds (hours)
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Fleet bucket thresholds (hours)
    #[serde(default)]
    pub fleet: FleetConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl HosConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults only when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_provenance().map(|(config, _)| config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Two-pass load: unknown-key warnings, then serde parse, then validation.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse_with_provenance(&contents, path)
    }

    fn parse_with_provenance(
        contents: &str,
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: contents
                .parse::<toml::Value>()
                .map(|v| super::validation::walk_toml_keys(&v, ""))
                .unwrap_or_default()
                .into_iter()
                .collect(),
        };

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok((config, provenance))
    }

    /// Same search order as `load()`, also returning which keys the user set.
    pub fn load_with_provenance() -> Result<(Self, ConfigProvenance), ConfigError> {
        let mut candidates = Vec::with_capacity(2);
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from(CONFIG_FILE_NAME));
        Self::load_first_existing(&candidates)
    }

    /// Load the first candidate path that exists.
    ///
    /// Missing files are skipped; an existing file that fails to parse or
    /// validate is an error. Defaults apply only when no candidate exists.
    pub fn load_first_existing(
        candidates: &[PathBuf],
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        for path in candidates {
            if !path.exists() {
                warn!(path = %path.display(), "Config file not found, skipping");
                continue;
            }
            let (config, provenance) = Self::load_from_file_with_provenance(path)?;
            info!(path = %path.display(), carrier = %config.carrier.name, "Loaded HOS config");
            return Ok((config, provenance));
        }

        info!("No {} found, using federal defaults", CONFIG_FILE_NAME);
        Ok((Self::default(), ConfigProvenance::default()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "HOS config saved");
        Ok(())
    }

    /// Range and consistency checks, plus full policy resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let l = &self.limits;
        let hour_fields = [
            ("limits.weekly_60_hours", l.weekly_60_hours),
            ("limits.weekly_70_hours", l.weekly_70_hours),
            ("limits.driving_hours", l.driving_hours),
            ("limits.on_duty_hours", l.on_duty_hours),
            ("limits.break_after_driving_hours", l.break_after_driving_hours),
            ("limits.break_hours", l.break_hours),
            ("limits.daily_reset_hours", l.daily_reset_hours),
            ("limits.restart_hours", l.restart_hours),
            ("thresholds.weekly_critical_margin_hours", self.thresholds.weekly_critical_margin_hours),
            ("thresholds.break_warning_hours", self.thresholds.break_warning_hours),
            ("thresholds.at_risk_weekly_hours", self.thresholds.at_risk_weekly_hours),
            ("thresholds.at_risk_driving_hours", self.thresholds.at_risk_driving_hours),
            ("thresholds.at_risk_on_duty_hours", self.thresholds.at_risk_on_duty_hours),
            ("fleet.limited_weekly_hours", self.fleet.limited_weekly_hours),
            ("fleet.rest_required_weekly_hours", self.fleet.rest_required_weekly_hours),
            ("fleet.rest_required_driving_hours", self.fleet.rest_required_driving_hours),
        ];
        for (name, value) in hour_fields {
            if !value.is_finite() {
                errors.push(format!("{name}: value must be finite (got {value})"));
            } else if value < 0.0 {
                errors.push(format!("{name} = {value:.2} cannot be negative"));
            }
        }

        if self.thresholds.break_warning_hours > l.break_after_driving_hours {
            errors.push(format!(
                "thresholds.break_warning_hours ({:.2}) must not exceed limits.break_after_driving_hours ({:.2})",
                self.thresholds.break_warning_hours, l.break_after_driving_hours
            ));
        }
        if self.fleet.rest_required_weekly_hours > self.fleet.limited_weekly_hours {
            errors.push(format!(
                "fleet.rest_required_weekly_hours ({:.1}) must be <= limited_weekly_hours ({:.1})",
                self.fleet.rest_required_weekly_hours, self.fleet.limited_weekly_hours
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        self.policy().map(|_| ())
    }

    /// Which weekly cycle this carrier runs under.
    pub fn weekly_cycle(&self) -> Result<WeeklyCycle, HosError> {
        let w = &self.weekly;
        match (w.cycle_60_7, w.cycle_70_8, w.precedence) {
            (true, false, _) => Ok(WeeklyCycle::Sixty7),
            (false, true, _) => Ok(WeeklyCycle::Seventy8),
            (true, true, Some(cycle)) => Ok(cycle),
            (true, true, None) => Err(HosError::InvalidPolicy(
                "both 60/7 and 70/8 cycles are enabled without a precedence".to_string(),
            )),
            (false, false, _) => Err(HosError::InvalidPolicy(
                "no weekly cycle is enabled (set weekly.cycle_60_7 or weekly.cycle_70_8)".to_string(),
            )),
        }
    }

    pub fn time_zone(&self) -> Result<Tz, HosError> {
        self.carrier.time_zone.parse::<Tz>().map_err(|_| {
            HosError::InvalidPolicy(format!(
                "unknown time zone '{}' in carrier.time_zone",
                self.carrier.time_zone
            ))
        })
    }

    /// Resolve the minute-based policy the engine evaluates against.
    pub fn policy(&self) -> Result<PolicyWindow, ConfigError> {
        let cycle = self.weekly_cycle()?;
        let l = &self.limits;
        let t = &self.thresholds;
        let weekly_hours = match cycle {
            WeeklyCycle::Sixty7 => l.weekly_60_hours,
            WeeklyCycle::Seventy8 => l.weekly_70_hours,
        };

        let policy = PolicyWindow {
            weekly_cycle: cycle,
            weekly_limit_minutes: hours_to_minutes(weekly_hours),
            driving_limit_minutes: hours_to_minutes(l.driving_hours),
            on_duty_limit_minutes: hours_to_minutes(l.on_duty_hours),
            break_after_driving_minutes: hours_to_minutes(l.break_after_driving_hours),
            break_minutes: hours_to_minutes(l.break_hours),
            daily_reset_minutes: hours_to_minutes(l.daily_reset_hours),
            restart_minutes: hours_to_minutes(l.restart_hours),
            restart_night_start_hour: l.restart_night_start_hour,
            restart_night_end_hour: l.restart_night_end_hour,
            restart_nights_required: l.restart_nights_required,
            time_zone: self.time_zone()?,
            advisory: AdvisoryThresholds {
                weekly_critical_margin_minutes: hours_to_minutes(t.weekly_critical_margin_hours),
                break_warning_minutes: hours_to_minutes(t.break_warning_hours),
                at_risk_weekly_minutes: hours_to_minutes(t.at_risk_weekly_hours),
                at_risk_driving_minutes: hours_to_minutes(t.at_risk_driving_hours),
                at_risk_on_duty_minutes: hours_to_minutes(t.at_risk_on_duty_hours),
                fleet_limited_weekly_minutes: hours_to_minutes(self.fleet.limited_weekly_hours),
                fleet_rest_weekly_minutes: hours_to_minutes(self.fleet.rest_required_weekly_hours),
                fleet_rest_driving_minutes: hours_to_minutes(self.fleet.rest_required_driving_hours),
            },
        };
        policy.validate()?;
        Ok(policy)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
    Policy(HosError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
            ConfigError::Policy(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<HosError> for ConfigError {
    fn from(e: HosError) -> Self {
        ConfigError::Policy(e)
    }
}

// ============================================================================
// Carrier Info
// ============================================================================

/// Identification plus the home-terminal time zone for restart nights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierInfo {
    #[serde(default = "default_carrier_name")]
    pub name: String,

    /// IANA zone name, e.g. "America/Chicago"
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_carrier_name() -> String {
    "DEFAULT".to_string()
}
fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

impl Default for CarrierInfo {
    fn default() -> Self {
        Self {
            name: default_carrier_name(),
            time_zone: default_time_zone(),
        }
    }
}

// ============================================================================
// Weekly Cycle Selection
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyConfig {
    #[serde(default = "default_true")]
    pub cycle_60_7: bool,

    #[serde(default)]
    pub cycle_70_8: bool,

    /// Cycle to use when both are enabled ("60_7" or "70_8").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedence: Option<WeeklyCycle>,
}

fn default_true() -> bool {
    true
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            cycle_60_7: true,
            cycle_70_8: false,
            precedence: None,
        }
    }
}

// ============================================================================
// Regulatory Limits
// ============================================================================

/// Limits in hours. Night bounds are local hours in the carrier time zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_weekly_60")]
    pub weekly_60_hours: f64,
    #[serde(default = "default_weekly_70")]
    pub weekly_70_hours: f64,
    #[serde(default = "default_driving")]
    pub driving_hours: f64,
    #[serde(default = "default_on_duty")]
    pub on_duty_hours: f64,
    #[serde(default = "default_break_after")]
    pub break_after_driving_hours: f64,
    #[serde(default = "default_break")]
    pub break_hours: f64,
    #[serde(default = "default_daily_reset")]
    pub daily_reset_hours: f64,
    #[serde(default = "default_restart")]
    pub restart_hours: f64,
    #[serde(default = "default_night_start")]
    pub restart_night_start_hour: u32,
    #[serde(default = "default_night_end")]
    pub restart_night_end_hour: u32,
    #[serde(default = "default_nights")]
    pub restart_nights_required: u32,
}

fn default_weekly_60() -> f64 { 60.0 }
fn default_weekly_70() -> f64 { 70.0 }
fn default_driving() -> f64 { 11.0 }
fn default_on_duty() -> f64 { 14.0 }
fn default_break_after() -> f64 { 8.0 }
fn default_break() -> f64 { 0.5 }
fn default_daily_reset() -> f64 { 10.0 }
fn default_restart() -> f64 { 34.0 }
fn default_night_start() -> u32 { 1 }
fn default_night_end() -> u32 { 5 }
fn default_nights() -> u32 { 2 }

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            weekly_60_hours: default_weekly_60(),
            weekly_70_hours: default_weekly_70(),
            driving_hours: default_driving(),
            on_duty_hours: default_on_duty(),
            break_after_driving_hours: default_break_after(),
            break_hours: default_break(),
            daily_reset_hours: default_daily_reset(),
            restart_hours: default_restart(),
            restart_night_start_hour: default_night_start(),
            restart_night_end_hour: default_night_end(),
            restart_nights_required: default_nights(),
        }
    }
}

// ============================================================================
// Advisory Thresholds
// ============================================================================

/// Severity and dashboard badge thresholds. Not regulatory limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Weekly violations over by more than this are CRITICAL, else HIGH.
    #[serde(default = "default_weekly_critical_margin")]
    pub weekly_critical_margin_hours: f64,

    /// Driving since the last daily rest at which `next_break_required` is raised.
    #[serde(default = "default_break_warning")]
    pub break_warning_hours: f64,

    #[serde(default = "default_at_risk_weekly")]
    pub at_risk_weekly_hours: f64,
    #[serde(default = "default_at_risk_driving")]
    pub at_risk_driving_hours: f64,
    #[serde(default = "default_at_risk_on_duty")]
    pub at_risk_on_duty_hours: f64,
}

fn default_weekly_critical_margin() -> f64 { 5.0 }
fn default_break_warning() -> f64 { 7.5 }
fn default_at_risk_weekly() -> f64 { 10.0 }
fn default_at_risk_driving() -> f64 { 2.0 }
fn default_at_risk_on_duty() -> f64 { 2.0 }

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            weekly_critical_margin_hours: default_weekly_critical_margin(),
            break_warning_hours: default_break_warning(),
            at_risk_weekly_hours: default_at_risk_weekly(),
            at_risk_driving_hours: default_at_risk_driving(),
            at_risk_on_duty_hours: default_at_risk_on_duty(),
        }
    }
}

// ============================================================================
// Fleet Buckets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Weekly hours available below which a driver is `limited`
    #[serde(default = "default_limited_weekly")]
    pub limited_weekly_hours: f64,
    #[serde(default = "default_rest_weekly")]
    pub rest_required_weekly_hours: f64,
    #[serde(default = "default_rest_driving")]
    pub rest_required_driving_hours: f64,
}

fn default_limited_weekly() -> f64 { 20.0 }
fn default_rest_weekly() -> f64 { 10.0 }
fn default_rest_driving() -> f64 { 2.0 }

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            limited_weekly_hours: default_limited_weekly(),
            rest_required_weekly_hours: default_rest_weekly(),
            rest_required_driving_hours: default_rest_driving(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
