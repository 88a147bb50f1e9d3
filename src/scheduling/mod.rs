//! Scheduling advisor
//!
//! Conflict checks for planned shifts and alternative-driver suggestions, both
//! driven by the violation predictor.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hos::{self, history_segments, HosError, PolicyWindow};
use crate::regulations::rule_reference;
use crate::types::{DriverHistory, ExcludedDriver, PlannedSegment, Prediction};

/// A planned shift for one driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub driver: DriverHistory,
    pub planned: Vec<PlannedSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub assignment_id: String,
    pub driver_id: String,
    pub prediction: Prediction,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub evaluated_at: DateTime<Utc>,
    pub checked: usize,
    pub conflicts: Vec<ScheduleConflict>,
    /// Assignments that could not be checked, keyed by assignment id.
    pub rejected: Vec<ExcludedDriver>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeDriver {
    pub driver_id: String,
    pub weekly_hours_available: f64,
    pub driving_hours_available: f64,
    pub on_duty_hours_available: f64,
}

fn predict_for(
    driver: &DriverHistory,
    planned: &[PlannedSegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<Option<Prediction>, HosError> {
    let segments = history_segments(&driver.driver_id, &driver.segments, &driver.records)?;
    hos::predict(&driver.driver_id, &segments, planned, at, policy)
}

/// Run the predictor for every assignment and list the ones that would violate.
pub fn check_assignments(
    assignments: &[Assignment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> ConflictReport {
    let results: Vec<(&Assignment, Result<Option<Prediction>, HosError>)> = assignments
        .par_iter()
        .map(|a| (a, predict_for(&a.driver, &a.planned, at, policy)))
        .collect();

    let mut conflicts = Vec::new();
    let mut rejected = Vec::new();
    for (a, result) in results {
        match result {
            Ok(Some(prediction)) => {
                let rule = rule_reference(prediction.first_violated_type);
                conflicts.push(ScheduleConflict {
                    assignment_id: a.assignment_id.clone(),
                    driver_id: a.driver.driver_id.clone(),
                    explanation: format!(
                        "{} would be exceeded at {}. {}",
                        rule.title,
                        prediction.projected_violation_instant.format("%Y-%m-%d %H:%M UTC"),
                        rule.summary
                    ),
                    prediction,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(assignment = %a.assignment_id, error = %e, "Assignment could not be checked");
                rejected.push(ExcludedDriver {
                    driver_id: a.assignment_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(checked = assignments.len(), conflicts = conflicts.len(), "Assignments checked");
    ConflictReport {
        evaluated_at: at,
        checked: assignments.len(),
        conflicts,
        rejected,
    }
}

/// Drivers who could take `planned` without any current or predicted violation,
/// most remaining weekly hours first.
pub fn suggest_alternatives(
    candidates: &[DriverHistory],
    planned: &[PlannedSegment],
    at: DateTime<Utc>,
    policy: &PolicyWindow,
    limit: usize,
) -> Vec<AlternativeDriver> {
    let mut eligible: Vec<AlternativeDriver> = candidates
        .par_iter()
        .filter_map(|c| {
            let segments = match history_segments(&c.driver_id, &c.segments, &c.records) {
                Ok(s) => s,
                Err(e) => {
                    warn!(driver = %c.driver_id, error = %e, "Candidate skipped");
                    return None;
                }
            };
            let (metrics, violations) = hos::evaluate(&c.driver_id, &segments, at, policy).ok()?;
            if !violations.is_empty() {
                return None;
            }
            match hos::predict(&c.driver_id, &segments, planned, at, policy) {
                Ok(None) => Some(AlternativeDriver {
                    driver_id: c.driver_id.clone(),
                    weekly_hours_available: metrics.weekly_hours_available,
                    driving_hours_available: metrics.driving_hours_available,
                    on_duty_hours_available: metrics.on_duty_hours_available,
                }),
                Ok(Some(_)) => None,
                Err(e) => {
                    warn!(driver = %c.driver_id, error = %e, "Candidate skipped");
                    None
                }
            }
        })
        .collect();

    eligible.sort_by(|a, b| {
        b.weekly_hours_available
            .total_cmp(&a.weekly_hours_available)
            .then_with(|| b.driving_hours_available.total_cmp(&a.driving_hours_available))
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });
    eligible.truncate(limit);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DutySegment, DutyStatus, ViolationType};
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn driven(id: &str, hours: u32) -> DriverHistory {
        DriverHistory::from_segments(
            id,
            vec![DutySegment::new(id, t(2, 6), t(2, 6 + hours), DutyStatus::Driving)],
        )
    }

    fn evening_shift() -> Vec<PlannedSegment> {
        vec![PlannedSegment::new(t(2, 16), t(2, 18), DutyStatus::Driving)]
    }

    #[test]
    fn test_conflict_reported_for_tired_driver() {
        let p = PolicyWindow::default();
        let assignments = vec![
            Assignment {
                assignment_id: "A1".into(),
                driver: driven("D1", 2),
                planned: evening_shift(),
            },
            Assignment {
                assignment_id: "A2".into(),
                // 7h driving, then a 3h break before the shift
                driver: driven("D2", 7),
                planned: evening_shift(),
            },
        ];
        let report = check_assignments(&assignments, t(2, 16), &p);
        assert_eq!(report.checked, 2);
        assert!(report.rejected.is_empty());
        assert!(report.conflicts.is_empty());

        let tired = vec![Assignment {
            assignment_id: "A3".into(),
            driver: DriverHistory::from_segments(
                "D3",
                vec![
                    DutySegment::new("D3", t(2, 4), t(2, 10), DutyStatus::Driving),
                    DutySegment::new("D3", t(2, 10), t(2, 11), DutyStatus::OnDutyNotDriving),
                    DutySegment::new("D3", t(2, 11), t(2, 16), DutyStatus::Driving),
                ],
            ),
            planned: evening_shift(),
        }];
        let report = check_assignments(&tired, t(2, 16), &p);
        assert_eq!(report.conflicts.len(), 1);
        let c = &report.conflicts[0];
        assert_eq!(c.prediction.first_violated_type, ViolationType::Driving11Hour);
        assert_eq!(c.prediction.projected_violation_instant, t(2, 16));
        assert!(c.explanation.starts_with("11-hour driving limit would be exceeded"));
    }

    #[test]
    fn test_bad_plan_is_rejected_not_conflict() {
        let p = PolicyWindow::default();
        let assignments = vec![Assignment {
            assignment_id: "A1".into(),
            driver: driven("D1", 2),
            planned: vec![PlannedSegment::new(t(2, 10), t(2, 12), DutyStatus::Driving)],
        }];
        let report = check_assignments(&assignments, t(2, 16), &p);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].driver_id, "A1");
    }

    #[test]
    fn test_alternatives_ranked_by_weekly_hours() {
        let p = PolicyWindow::default();
        let candidates = vec![
            driven("busy", 6),
            driven("fresh", 1),
            DriverHistory::from_segments(
                "maxed",
                vec![
                    DutySegment::new("maxed", t(2, 4), t(2, 10), DutyStatus::Driving),
                    DutySegment::new("maxed", t(2, 10), t(2, 11), DutyStatus::OnDutyNotDriving),
                    DutySegment::new("maxed", t(2, 11), t(2, 16), DutyStatus::Driving),
                ],
            ),
            driven("mid", 3),
        ];
        let alts = suggest_alternatives(&candidates, &evening_shift(), t(2, 16), &p, 2);
        let ids: Vec<&str> = alts.iter().map(|a| a.driver_id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "mid"]);
        assert!((alts[0].weekly_hours_available - 59.0).abs() < 1e-9);
    }
}
