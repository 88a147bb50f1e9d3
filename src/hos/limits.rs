//! Limit evaluator
//!
//! Checks duty totals against each limit independently. Every exceeded limit
//! is reported; severity depends only on the limit type and margin.

use chrono::{DateTime, Utc};

use super::policy::PolicyWindow;
use super::window::DutyTotals;
use crate::types::{minutes_to_hours, DutyStatus, Severity, Violation, ViolationType};

/// One limit's usage at an evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitReading {
    pub violation_type: ViolationType,
    pub used_minutes: i64,
    pub limit_minutes: i64,
    /// The break rule triggers on reaching its limit; the others on exceeding it.
    pub inclusive: bool,
}

impl LimitReading {
    pub fn is_violated(&self) -> bool {
        if self.inclusive {
            self.used_minutes >= self.limit_minutes
        } else {
            self.used_minutes > self.limit_minutes
        }
    }

    pub fn remaining_minutes(&self) -> i64 {
        (self.limit_minutes - self.used_minutes).max(0)
    }

    pub fn margin_minutes(&self) -> i64 {
        self.used_minutes - self.limit_minutes
    }

    /// Whether time spent in `status` adds to this limit's usage.
    pub fn accrues_under(&self, status: DutyStatus) -> bool {
        match self.violation_type {
            ViolationType::Driving11Hour | ViolationType::Break30Minute => status.is_driving(),
            ViolationType::OnDuty14Hour
            | ViolationType::Weekly60Hour
            | ViolationType::Weekly70Hour => status.is_on_duty(),
        }
    }
}

/// Readings for the four limits in force: driving, on-duty, break, and the
/// configured weekly cycle.
pub fn limit_readings(totals: &DutyTotals, policy: &PolicyWindow) -> [LimitReading; 4] {
    [
        LimitReading {
            violation_type: ViolationType::Driving11Hour,
            used_minutes: totals.driving_since_rest_minutes,
            limit_minutes: policy.driving_limit_minutes,
            inclusive: false,
        },
        LimitReading {
            violation_type: ViolationType::OnDuty14Hour,
            used_minutes: totals.on_duty_since_rest_minutes,
            limit_minutes: policy.on_duty_limit_minutes,
            inclusive: false,
        },
        LimitReading {
            violation_type: ViolationType::Break30Minute,
            used_minutes: totals.driving_since_break_minutes,
            limit_minutes: policy.break_after_driving_minutes,
            inclusive: true,
        },
        LimitReading {
            violation_type: policy.weekly_cycle.violation_type(),
            used_minutes: totals.weekly_minutes(policy.weekly_cycle),
            limit_minutes: policy.weekly_limit_minutes,
            inclusive: false,
        },
    ]
}

pub fn severity_for(violation_type: ViolationType, margin_minutes: i64, policy: &PolicyWindow) -> Severity {
    if violation_type.is_weekly() && margin_minutes <= policy.advisory.weekly_critical_margin_minutes {
        Severity::High
    } else {
        Severity::Critical
    }
}

pub fn to_violation(reading: &LimitReading, at: DateTime<Utc>, policy: &PolicyWindow) -> Violation {
    let margin = reading.margin_minutes();
    Violation {
        violation_type: reading.violation_type,
        severity: severity_for(reading.violation_type, margin, policy),
        observed_value: minutes_to_hours(reading.used_minutes),
        limit_value: minutes_to_hours(reading.limit_minutes),
        margin: minutes_to_hours(margin),
        evaluated_at: at,
    }
}

/// All violations active at `totals.evaluated_at`.
pub fn evaluate_limits(totals: &DutyTotals, policy: &PolicyWindow) -> Vec<Violation> {
    limit_readings(totals, policy)
        .iter()
        .filter(|r| r.is_violated())
        .map(|r| to_violation(r, totals.evaluated_at, policy))
        .collect()
}
