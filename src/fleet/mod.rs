//! Fleet evaluation
//!
//! Parallel map of the per-driver engine over a fleet followed by the
//! aggregator reduction. Drivers whose duty data is malformed are reported in
//! `excluded` and left out of every count and average.

mod aggregator;

pub use aggregator::{aggregate, classify};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::hos::{self, history_segments, HosError, PolicyWindow};
use crate::reporting::compliance_status;
use crate::types::{DriverEvaluation, DriverHistory, ExcludedDriver, FleetSummary};

/// Evaluate one driver's raw history into the aggregator's input.
pub fn evaluate_driver(
    history: &DriverHistory,
    at: DateTime<Utc>,
    policy: &PolicyWindow,
) -> Result<DriverEvaluation, HosError> {
    let segments = history_segments(&history.driver_id, &history.segments, &history.records)?;
    let (metrics, violations) = hos::evaluate(&history.driver_id, &segments, at, policy)?;
    let status = compliance_status(&metrics, &violations, policy);
    Ok(DriverEvaluation {
        metrics,
        violations,
        status,
    })
}

pub fn evaluate_fleet(drivers: &[DriverHistory], at: DateTime<Utc>, policy: &PolicyWindow) -> FleetSummary {
    let results: Vec<(String, Result<DriverEvaluation, HosError>)> = drivers
        .par_iter()
        .map(|d| (d.driver_id.clone(), evaluate_driver(d, at, policy)))
        .collect();

    let mut evaluations = Vec::with_capacity(results.len());
    let mut excluded = Vec::new();
    for (driver_id, result) in results {
        match result {
            Ok(eval) => evaluations.push(eval),
            Err(e) => {
                warn!(driver = %driver_id, error = %e, "Driver excluded from fleet summary");
                excluded.push(ExcludedDriver {
                    driver_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    let summary = aggregate(&evaluations, excluded, at, policy);
    info!(
        at = %at,
        drivers = summary.total_drivers,
        available = summary.counts.available,
        limited = summary.counts.limited,
        rest_required = summary.counts.rest_required,
        violation = summary.counts.violation,
        excluded = summary.excluded.len(),
        "Fleet evaluated"
    );
    summary
}
