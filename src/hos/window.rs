//! Rolling window calculator
//!
//! Sums on-duty and driving minutes over the trailing 7- and 8-day windows
//! (floored at the most recent qualifying restart) and since the last
//! qualifying daily rest and 30-minute break. Everything is integer minutes;
//! hours appear only when `DriverMetrics` is built.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::policy::PolicyWindow;
use super::restart;
use super::timeline::Timeline;
use crate::types::WeeklyCycle;

/// Minute-level duty totals at one evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DutyTotals {
    pub evaluated_at: DateTime<Utc>,
    pub on_duty_7d_minutes: i64,
    pub on_duty_8d_minutes: i64,
    pub driving_since_rest_minutes: i64,
    pub on_duty_since_rest_minutes: i64,
    pub driving_since_break_minutes: i64,
    /// End of the most recent rest span long enough to reset the daily counters
    pub last_rest_end: Option<DateTime<Utc>>,
    pub last_qualifying_restart: Option<DateTime<Utc>>,
}

impl DutyTotals {
    pub fn weekly_minutes(&self, cycle: WeeklyCycle) -> i64 {
        match cycle {
            WeeklyCycle::Sixty7 => self.on_duty_7d_minutes,
            WeeklyCycle::Seventy8 => self.on_duty_8d_minutes,
        }
    }
}

/// On-duty minutes in `[at - days, at)`, never counting time before `floor`.
pub fn rolling_on_duty_minutes(
    timeline: &Timeline,
    days: i64,
    floor: Option<DateTime<Utc>>,
) -> i64 {
    let at = timeline.until();
    let naive_start = at - Duration::days(days);
    let from = floor.map_or(naive_start, |f| f.max(naive_start));
    timeline.on_duty_minutes(from, at)
}

/// End of the latest run satisfying `pred` that lasted at least `min_minutes`.
fn last_qualifying_end(
    spans: Vec<super::timeline::Span>,
    min_minutes: i64,
) -> Option<DateTime<Utc>> {
    spans
        .into_iter()
        .rev()
        .find(|s| s.minutes() >= min_minutes)
        .map(|s| s.end)
}

/// End of the most recent rest span of at least the daily reset length.
pub fn last_rest_end(timeline: &Timeline, policy: &PolicyWindow) -> Option<DateTime<Utc>> {
    last_qualifying_end(timeline.rest_spans(), policy.daily_reset_minutes)
}

/// End of the most recent non-driving span of at least the break length.
pub fn last_break_end(timeline: &Timeline, policy: &PolicyWindow) -> Option<DateTime<Utc>> {
    last_qualifying_end(timeline.non_driving_spans(), policy.break_minutes)
}

/// Compute all duty totals at the timeline's end instant.
pub fn compute_totals(timeline: &Timeline, policy: &PolicyWindow) -> DutyTotals {
    let at = timeline.until();
    let restart = restart::last_qualifying_restart(timeline, policy);

    let history_start = timeline.start().unwrap_or(at);
    let rest_end = last_rest_end(timeline, policy);
    let reset_point = rest_end.unwrap_or(history_start);
    let break_point = last_break_end(timeline, policy)
        .unwrap_or(history_start)
        .max(reset_point);

    DutyTotals {
        evaluated_at: at,
        on_duty_7d_minutes: rolling_on_duty_minutes(timeline, 7, restart),
        on_duty_8d_minutes: rolling_on_duty_minutes(timeline, 8, restart),
        driving_since_rest_minutes: timeline.driving_minutes(reset_point, at),
        on_duty_since_rest_minutes: timeline.on_duty_minutes(reset_point, at),
        driving_since_break_minutes: timeline.driving_minutes(break_point, at),
        last_rest_end: rest_end,
        last_qualifying_restart: restart,
    }
}
