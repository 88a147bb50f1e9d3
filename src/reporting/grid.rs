//! 60/7 or 70/8 cycle grid
//!
//! One row per local calendar day (home-terminal time zone) covering the cycle
//! length that ends on the evaluation day. The running total counts on-duty
//! time from the first grid day, or from the last qualifying restart when that
//! is later.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::status::compliance_status;
use crate::hos::{self, normalize_segments, HosError, PolicyWindow, Timeline};
use crate::regulations;
use crate::types::{minutes_to_hours, ComplianceStatus, DutySegment, WeeklyCycle};

#[derive(Debug, Clone, Serialize)]
pub struct GridDay {
    pub date: NaiveDate,
    pub on_duty_hours: f64,
    pub driving_hours: f64,
    pub cycle_total_hours: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleGrid {
    pub driver_id: String,
    pub weekly_cycle: WeeklyCycle,
    pub evaluated_at: DateTime<Utc>,
    pub limit_hours: f64,
    pub hours_available: f64,
    pub status: ComplianceStatus,
    pub days: Vec<GridDay>,
}

/// UTC instant of local midnight starting `date`.
fn local_midnight(date: NaiveDate, policy: &PolicyWindow) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    policy
        .time_zone
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn cycle_grid(
    driver_id: &str,
    segments: &[DutySegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<CycleGrid, HosError> {
    let (metrics, violations) = hos::evaluate(driver_id, segments, at, policy)?;
    let status = compliance_status(&metrics, &violations, policy);
    let history = normalize_segments(driver_id, segments)?;
    let timeline = Timeline::new(driver_id, &history, at);

    let cycle = policy.weekly_cycle;
    let limit_hours = minutes_to_hours(policy.weekly_limit_minutes);
    let last_day = at.with_timezone(&policy.time_zone).date_naive();
    let first_day = last_day - Duration::days(cycle.days() - 1);

    let grid_start = local_midnight(first_day, policy).unwrap_or(at - Duration::days(cycle.days()));
    let counted_from = metrics
        .last_qualifying_restart
        .map_or(grid_start, |r| r.max(grid_start));

    let mut days = Vec::with_capacity(cycle.days() as usize);
    let mut date = first_day;
    while date <= last_day {
        let Some(next) = date.succ_opt() else { break };
        let day_start = local_midnight(date, policy).unwrap_or(grid_start);
        let day_close = local_midnight(next, policy).unwrap_or(at);
        let day_end = day_close.min(at);

        let on_duty = timeline.on_duty_minutes(day_start, day_end);
        let driving = timeline.driving_minutes(day_start, day_end);
        // Rows closing before the restart keep the total of the cycle they belonged to.
        let from = if day_end > counted_from { counted_from } else { grid_start };
        let cycle_total = timeline.on_duty_minutes(from, day_end);

        let mut reasons = Vec::new();
        if let Some(restart) = metrics.last_qualifying_restart {
            if restart >= day_start && restart < day_close {
                reasons.push(regulations::restart_reason());
            }
        }
        if cycle_total > policy.weekly_limit_minutes {
            reasons.push(regulations::cycle_over_reason(
                cycle,
                minutes_to_hours(cycle_total),
                limit_hours,
            ));
        }
        if date == last_day {
            reasons.extend(violations.iter().map(regulations::explain));
            let weekly_active = violations.iter().any(|v| v.violation_type.is_weekly());
            if !weekly_active
                && hos::hours_to_minutes(metrics.weekly_hours_available) < policy.advisory.at_risk_weekly_minutes
            {
                reasons.push(regulations::cycle_near_reason(cycle, metrics.weekly_hours_available));
            }
            if metrics.next_break_required {
                reasons.push(regulations::break_reason(metrics.driving_hours_since_rest));
            }
        }

        days.push(GridDay {
            date,
            on_duty_hours: minutes_to_hours(on_duty),
            driving_hours: minutes_to_hours(driving),
            cycle_total_hours: minutes_to_hours(cycle_total),
            reasons,
        });
        date = next;
    }

    Ok(CycleGrid {
        driver_id: driver_id.to_string(),
        weekly_cycle: cycle,
        evaluated_at: at,
        limit_hours,
        hours_available: metrics.weekly_hours_available,
        status,
        days,
    })
}
