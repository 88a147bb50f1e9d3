//! Compliance output types: metrics, violations, predictions, dashboard status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Convert an internal minute count to presentation hours.
#[allow(clippy::cast_precision_loss)]
pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

// ============================================================================
// Weekly Cycle
// ============================================================================

/// The weekly on-duty cycle a carrier operates under. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeeklyCycle {
    #[serde(rename = "60_7")]
    Sixty7,
    #[serde(rename = "70_8")]
    Seventy8,
}

impl WeeklyCycle {
    pub fn days(self) -> i64 {
        match self {
            Self::Sixty7 => 7,
            Self::Seventy8 => 8,
        }
    }

    pub fn violation_type(self) -> ViolationType {
        match self {
            Self::Sixty7 => ViolationType::Weekly60Hour,
            Self::Seventy8 => ViolationType::Weekly70Hour,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sixty7 => "60/7",
            Self::Seventy8 => "70/8",
        }
    }
}

impl std::fmt::Display for WeeklyCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Violations
// ============================================================================

/// Ordering doubles as the tie-break priority when two limits cross at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationType {
    #[serde(rename = "DRIVING_11_HOUR")]
    Driving11Hour,
    #[serde(rename = "ON_DUTY_14_HOUR")]
    OnDuty14Hour,
    #[serde(rename = "BREAK_30_MINUTE")]
    Break30Minute,
    #[serde(rename = "WEEKLY_60_HOUR")]
    Weekly60Hour,
    #[serde(rename = "WEEKLY_70_HOUR")]
    Weekly70Hour,
}

impl ViolationType {
    pub fn is_weekly(self) -> bool {
        matches!(self, Self::Weekly60Hour | Self::Weekly70Hour)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Driving11Hour => "DRIVING_11_HOUR",
            Self::OnDuty14Hour => "ON_DUTY_14_HOUR",
            Self::Break30Minute => "BREAK_30_MINUTE",
            Self::Weekly60Hour => "WEEKLY_60_HOUR",
            Self::Weekly70Hour => "WEEKLY_70_HOUR",
        }
    }
}

impl std::fmt::Display for ViolationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Critical,
}

/// A limit exceeded at `evaluated_at`. Values are hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub observed_value: f64,
    pub limit_value: f64,
    /// observed - limit
    pub margin: f64,
    pub evaluated_at: DateTime<Utc>,
}

// ============================================================================
// Driver Metrics
// ============================================================================

/// Per-driver compliance snapshot at one evaluation instant. All durations in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMetrics {
    pub driver_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub weekly_cycle: WeeklyCycle,
    pub hours_used_7d: f64,
    pub hours_used_8d: f64,
    pub driving_hours_since_rest: f64,
    pub on_duty_hours_since_rest: f64,
    pub driving_hours_since_break: f64,
    pub weekly_hours_available: f64,
    pub driving_hours_available: f64,
    pub on_duty_hours_available: f64,
    pub break_hours_available: f64,
    pub last_rest_end: Option<DateTime<Utc>>,
    pub last_qualifying_restart: Option<DateTime<Utc>>,
    pub next_break_required: bool,
    pub can_drive: bool,
}

impl DriverMetrics {
    /// Hours used under the configured cycle.
    pub fn weekly_hours_used(&self) -> f64 {
        match self.weekly_cycle {
            WeeklyCycle::Sixty7 => self.hours_used_7d,
            WeeklyCycle::Seventy8 => self.hours_used_8d,
        }
    }
}

// ============================================================================
// Prediction
// ============================================================================

/// First violation projected by a planned schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub driver_id: String,
    pub first_violated_type: ViolationType,
    pub severity: Severity,
    pub projected_violation_instant: DateTime<Utc>,
    /// observed - limit for `first_violated_type` at the end of the plan (hours)
    pub projected_margin_at_plan_end: f64,
    /// Index into the planned segment list of the segment that crosses the limit
    pub segment_index: usize,
}

// ============================================================================
// Dashboard Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Ok,
    AtRisk,
    Violation,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::AtRisk => "AT_RISK",
            Self::Violation => "VIOLATION",
        };
        f.write_str(s)
    }
}
