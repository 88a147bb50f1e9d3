//! Hours-of-Service compliance engine
//!
//! Typed pipeline from raw duty data to compliance results:
//!
//! 1. **Segments** (`segments`): attendance records / caller segments → normalised history
//! 2. **Timeline** (`timeline`): gap-filled history clipped at the evaluation instant
//! 3. **Window** (`window`, `restart`): rolling and since-rest minute totals
//! 4. **Limits** (`limits`): violations with severity and margin
//! 5. **Availability** (`availability`): remaining hours, `can_drive`
//! 6. **Predictor** (`predictor`): first violation caused by a planned schedule
//!
//! Every function here is pure. The evaluation instant is always an argument;
//! nothing reads the clock, so identical inputs give identical results and
//! drivers can be evaluated concurrently without coordination.

pub mod availability;
pub mod limits;
pub mod policy;
pub mod predictor;
pub mod restart;
pub mod segments;
pub mod timeline;
pub mod window;

pub use availability::{availability, build_metrics, Availability};
pub use limits::{evaluate_limits, limit_readings, severity_for, LimitReading};
pub use policy::{hours_to_minutes, AdvisoryThresholds, PolicyWindow};
pub use segments::{build_segments, group_by_driver, history_segments, normalize_segments};
pub use timeline::{Span, Timeline};
pub use window::{compute_totals, DutyTotals};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::types::{AttendanceRecord, DriverMetrics, DutySegment, PlannedSegment, Prediction, Violation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HosError {
    /// Inverted, zero-length, overlapping or mis-attributed duty intervals.
    #[error("Malformed duty data for driver {driver_id}: {reason}")]
    MalformedSegment { driver_id: String, reason: String },

    #[error("Invalid HOS policy: {0}")]
    InvalidPolicy(String),
}

impl HosError {
    pub fn malformed(driver_id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSegment {
            driver_id: driver_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Minute-level totals for a driver at `at`, after normalising `segments`.
pub fn driver_totals(
    driver_id: &str,
    segments: &[DutySegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<DutyTotals, HosError> {
    let history = normalize_segments(driver_id, segments)?;
    let timeline = Timeline::new(driver_id, &history, at);
    Ok(compute_totals(&timeline, policy))
}

/// Evaluate a driver's compliance at `at`.
pub fn evaluate(
    driver_id: &str,
    segments: &[DutySegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<(DriverMetrics, Vec<Violation>), HosError> {
    let totals = driver_totals(driver_id, segments, at, policy)?;
    let violations = evaluate_limits(&totals, policy);
    let metrics = build_metrics(driver_id, at, &totals, &violations, policy);

    debug!(
        driver = %driver_id,
        at = %at,
        weekly_used_min = totals.weekly_minutes(policy.weekly_cycle),
        violations = violations.len(),
        can_drive = metrics.can_drive,
        "Driver evaluated"
    );
    Ok((metrics, violations))
}

/// Evaluate a driver straight from timecard records.
pub fn evaluate_records(
    driver_id: &str,
    records: &[AttendanceRecord],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<(DriverMetrics, Vec<Violation>), HosError> {
    let segments = history_segments(driver_id, &[], records)?;
    evaluate(driver_id, &segments, at, policy)
}

/// Predict the first violation a planned schedule would cause.
pub fn predict(
    driver_id: &str,
    segments: &[DutySegment],
    planned: &[PlannedSegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<Option<Prediction>, HosError> {
    let history = normalize_segments(driver_id, segments)?;
    let prediction = predictor::predict_violation(driver_id, &history, planned, at, policy)?;
    if let Some(ref p) = prediction {
        debug!(
            driver = %driver_id,
            violation = %p.first_violated_type,
            at = %p.projected_violation_instant,
            "Violation predicted"
        );
    }
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DutyStatus;
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_evaluate_empty_history_is_clean() {
        let (m, v) = evaluate("D1", &[], t(2, 12), &PolicyWindow::default()).unwrap();
        assert!(v.is_empty());
        assert!(m.can_drive);
        assert!((m.weekly_hours_available - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_rejects_overlap() {
        let segs = vec![
            DutySegment::new("D1", t(2, 8), t(2, 12), DutyStatus::Driving),
            DutySegment::new("D1", t(2, 10), t(2, 14), DutyStatus::Driving),
        ];
        let err = evaluate("D1", &segs, t(2, 14), &PolicyWindow::default()).unwrap_err();
        assert!(matches!(err, HosError::MalformedSegment { ref driver_id, .. } if driver_id == "D1"));
    }

    #[test]
    fn test_evaluate_records_matches_segments() {
        let p = PolicyWindow::default();
        let records = vec![AttendanceRecord::new("D1", t(2, 8), t(2, 18))];
        let segs = vec![DutySegment::new("D1", t(2, 8), t(2, 18), DutyStatus::Driving)];
        let a = evaluate_records("D1", &records, t(2, 20), &p).unwrap();
        let b = evaluate("D1", &segs, t(2, 20), &p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_error_display() {
        let e = HosError::malformed("D9", "bad interval");
        assert_eq!(e.to_string(), "Malformed duty data for driver D9: bad interval");
    }
}
