//! Violation predictor
//!
//! Appends planned segments to a driver's history one at a time and
//! re-evaluates the limits at the end of each. The first planned on-duty
//! segment that leaves a limit it accrues to in violation is responsible; the
//! crossing instant inside it is found by linear interpolation from the usage
//! at the segment start. Weekly usage can lose minutes off the back of the
//! rolling window while the segment runs, so weekly crossings are then moved
//! forward to the first minute the full calculator agrees with.

use chrono::{DateTime, Duration, Utc};

use super::limits::{limit_readings, LimitReading};
use super::policy::PolicyWindow;
use super::timeline::Timeline;
use super::window::compute_totals;
use super::{severity_for, HosError};
use crate::types::{minutes_to_hours, DutySegment, PlannedSegment, Prediction, ViolationType};

fn readings_at(
    driver_id: &str,
    segments: &[DutySegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> [LimitReading; 4] {
    let timeline = Timeline::new(driver_id, segments, at);
    limit_readings(&compute_totals(&timeline, policy), policy)
}

fn reading_for(readings: &[LimitReading; 4], vt: ViolationType) -> Option<LimitReading> {
    readings.iter().copied().find(|r| r.violation_type == vt)
}

/// Check a plan is ordered, non-overlapping and starts no earlier than `at`.
pub fn validate_plan(
    driver_id: &str,
    planned: &[PlannedSegment],
    at: DateTime<Utc>,
) -> Result<(), HosError> {
    let mut cursor = at;
    for (i, p) in planned.iter().enumerate() {
        if p.end <= p.start {
            return Err(HosError::malformed(
                driver_id,
                format!("planned segment {i} ({} - {}) has no positive duration", p.start, p.end),
            ));
        }
        if p.start < cursor {
            return Err(HosError::malformed(
                driver_id,
                format!(
                    "planned segment {i} starts {} before {cursor} (plans must be chronological and after the evaluation instant)",
                    p.start
                ),
            ));
        }
        cursor = p.end;
    }
    Ok(())
}

/// First minute in `[lower, upper]` at which weekly usage reaches its limit.
fn refine_weekly_crossing(
    driver_id: &str,
    segments: &[DutySegment],
    vt: ViolationType,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
    policy: &PolicyWindow,
) -> DateTime<Utc> {
    let reached = |t: DateTime<Utc>| {
        reading_for(&readings_at(driver_id, segments, t, policy), vt)
            .is_some_and(|r| r.used_minutes >= r.limit_minutes)
    };
    if reached(lower) {
        return lower;
    }
    let (mut lo, mut hi) = (lower, upper);
    while (hi - lo).num_minutes() > 1 {
        let mid = lo + Duration::minutes((hi - lo).num_minutes() / 2);
        if reached(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

/// Project `history` forward through `planned` and report the first violation.
///
/// `history` must already be normalised. Time between the evaluation instant
/// and the first planned segment, and between planned segments, is off duty.
pub fn predict_violation(
    driver_id: &str,
    history: &[DutySegment],
    planned: &[PlannedSegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<Option<Prediction>, HosError> {
    validate_plan(driver_id, planned, at)?;

    let mut combined: Vec<DutySegment> = history
        .iter()
        .filter(|s| s.start < at)
        .map(|s| DutySegment::new(driver_id, s.start, s.end.min(at), s.status))
        .collect();

    for (index, p) in planned.iter().enumerate() {
        let seg = p.for_driver(driver_id);
        if !p.status.is_on_duty() {
            combined.push(seg);
            continue;
        }

        let before = readings_at(driver_id, &combined, p.start, policy);
        combined.push(seg);
        let after = readings_at(driver_id, &combined, p.end, policy);

        let mut first: Option<(DateTime<Utc>, ViolationType)> = None;
        for end_reading in after.iter().filter(|r| r.is_violated() && r.accrues_under(p.status)) {
            let vt = end_reading.violation_type;
            let offset = reading_for(&before, vt).map_or(0, |r| {
                if r.is_violated() {
                    0
                } else {
                    r.remaining_minutes()
                }
            });
            let mut crossing = (p.start + Duration::minutes(offset)).min(p.end);
            if vt.is_weekly() {
                crossing = refine_weekly_crossing(driver_id, &combined, vt, crossing, p.end, policy);
            }
            if first.map_or(true, |(t, v)| (crossing, vt) < (t, v)) {
                first = Some((crossing, vt));
            }
        }

        if let Some((instant, vt)) = first {
            let plan_end = planned.last().map_or(p.end, |last| last.end);
            let mut full: Vec<DutySegment> = combined.clone();
            full.extend(planned[index + 1..].iter().map(|q| q.for_driver(driver_id)));
            let margin = reading_for(&readings_at(driver_id, &full, plan_end, policy), vt)
                .map_or(0, |r| r.margin_minutes());
            let crossing_margin = reading_for(&after, vt).map_or(0, |r| r.margin_minutes());

            return Ok(Some(Prediction {
                driver_id: driver_id.to_string(),
                first_violated_type: vt,
                severity: severity_for(vt, crossing_margin, policy),
                projected_violation_instant: instant,
                projected_margin_at_plan_end: minutes_to_hours(margin),
                segment_index: index,
            }));
        }
    }

    Ok(None)
}
