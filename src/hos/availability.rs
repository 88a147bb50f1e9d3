//! Availability engine: remaining capacity under each limit

use chrono::{DateTime, Utc};

use super::limits::limit_readings;
use super::policy::PolicyWindow;
use super::window::DutyTotals;
use crate::types::{minutes_to_hours, DriverMetrics, Violation, ViolationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub weekly_minutes: i64,
    pub driving_minutes: i64,
    pub on_duty_minutes: i64,
    pub break_minutes: i64,
    pub next_break_required: bool,
    pub can_drive: bool,
}

pub fn availability(totals: &DutyTotals, violations: &[Violation], policy: &PolicyWindow) -> Availability {
    let readings = limit_readings(totals, policy);
    let remaining = |vt: ViolationType| {
        readings
            .iter()
            .find(|r| r.violation_type == vt)
            .map_or(0, super::limits::LimitReading::remaining_minutes)
    };

    let weekly_minutes = remaining(policy.weekly_cycle.violation_type());
    let driving_minutes = remaining(ViolationType::Driving11Hour);
    let on_duty_minutes = remaining(ViolationType::OnDuty14Hour);
    let break_minutes = remaining(ViolationType::Break30Minute);

    let can_drive = violations.is_empty()
        && weekly_minutes > 0
        && driving_minutes > 0
        && on_duty_minutes > 0
        && break_minutes > 0;

    Availability {
        weekly_minutes,
        driving_minutes,
        on_duty_minutes,
        break_minutes,
        next_break_required: totals.driving_since_rest_minutes >= policy.advisory.break_warning_minutes,
        can_drive,
    }
}

/// Assemble the presentation-level metrics for one driver.
pub fn build_metrics(
    driver_id: &str,
    at: DateTime<Utc>,
    totals: &DutyTotals,
    violations: &[Violation],
    policy: &PolicyWindow,
) -> DriverMetrics {
    let avail = availability(totals, violations, policy);
    DriverMetrics {
        driver_id: driver_id.to_string(),
        evaluated_at: at,
        weekly_cycle: policy.weekly_cycle,
        hours_used_7d: minutes_to_hours(totals.on_duty_7d_minutes),
        hours_used_8d: minutes_to_hours(totals.on_duty_8d_minutes),
        driving_hours_since_rest: minutes_to_hours(totals.driving_since_rest_minutes),
        on_duty_hours_since_rest: minutes_to_hours(totals.on_duty_since_rest_minutes),
        driving_hours_since_break: minutes_to_hours(totals.driving_since_break_minutes),
        weekly_hours_available: minutes_to_hours(avail.weekly_minutes),
        driving_hours_available: minutes_to_hours(avail.driving_minutes),
        on_duty_hours_available: minutes_to_hours(avail.on_duty_minutes),
        break_hours_available: minutes_to_hours(avail.break_minutes),
        last_rest_end: totals.last_rest_end,
        last_qualifying_restart: totals.last_qualifying_restart,
        next_break_required: avail.next_break_required,
        can_drive: avail.can_drive,
    }
}
