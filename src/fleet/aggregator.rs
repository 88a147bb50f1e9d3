//! Fleet aggregator: bucket classification and dashboard summary

use chrono::{DateTime, Utc};

use crate::hos::{hours_to_minutes, PolicyWindow};
use crate::types::{
    minutes_to_hours, BucketCounts, DriverEvaluation, DriverRow, ExcludedDriver, FleetBucket,
    FleetSummary,
};

/// Dashboard bucket for one driver, highest precedence first.
pub fn classify(eval: &DriverEvaluation, policy: &PolicyWindow) -> FleetBucket {
    let m = &eval.metrics;
    let a = &policy.advisory;
    let weekly = hours_to_minutes(m.weekly_hours_available);
    let driving = hours_to_minutes(m.driving_hours_available);

    if !eval.violations.is_empty() {
        FleetBucket::Violation
    } else if !m.can_drive
        || weekly < a.fleet_rest_weekly_minutes
        || driving < a.fleet_rest_driving_minutes
    {
        FleetBucket::RestRequired
    } else if weekly < a.fleet_limited_weekly_minutes {
        FleetBucket::Limited
    } else {
        FleetBucket::Available
    }
}

pub fn aggregate(
    evaluations: &[DriverEvaluation],
    excluded: Vec<ExcludedDriver>,
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> FleetSummary {
    let mut counts = BucketCounts::default();
    let mut drivers = Vec::with_capacity(evaluations.len());

    for eval in evaluations {
        let bucket = classify(eval, policy);
        match bucket {
            FleetBucket::Available => counts.available += 1,
            FleetBucket::Limited => counts.limited += 1,
            FleetBucket::RestRequired => counts.rest_required += 1,
            FleetBucket::Violation => counts.violation += 1,
        }
        drivers.push(DriverRow {
            driver_id: eval.metrics.driver_id.clone(),
            bucket,
            status: eval.status,
            weekly_hours_used: eval.metrics.weekly_hours_used(),
            weekly_hours_available: eval.metrics.weekly_hours_available,
            driving_hours_available: eval.metrics.driving_hours_available,
            violation_count: eval.violations.len(),
        });
    }

    let n = evaluations.len();
    let (average_hours_used_7d, average_utilization_percent) = if n == 0 {
        (0.0, 0.0)
    } else {
        let limit = minutes_to_hours(policy.weekly_limit_minutes);
        let used_7d: f64 = evaluations.iter().map(|e| e.metrics.hours_used_7d).sum();
        let utilization: f64 = evaluations
            .iter()
            .map(|e| e.metrics.weekly_hours_used() / limit * 100.0)
            .sum();
        (used_7d / n as f64, utilization / n as f64)
    };

    FleetSummary {
        evaluated_at: at,
        counts,
        total_drivers: n,
        average_hours_used_7d,
        average_utilization_percent,
        drivers,
        excluded,
    }
}
