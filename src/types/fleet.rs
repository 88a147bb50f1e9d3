//! Fleet-level aggregation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AttendanceRecord, ComplianceStatus, DriverMetrics, DutySegment, Violation};

/// Raw duty data for one driver: explicit segments, timecard records, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverHistory {
    pub driver_id: String,
    #[serde(default)]
    pub segments: Vec<DutySegment>,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

impl DriverHistory {
    pub fn from_segments(driver_id: &str, segments: Vec<DutySegment>) -> Self {
        Self {
            driver_id: driver_id.to_string(),
            segments,
            records: Vec::new(),
        }
    }

    pub fn from_records(driver_id: &str, records: Vec<AttendanceRecord>) -> Self {
        Self {
            driver_id: driver_id.to_string(),
            segments: Vec::new(),
            records,
        }
    }
}

/// Dashboard bucket. Precedence: Violation > RestRequired > Limited > Available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetBucket {
    Available,
    Limited,
    RestRequired,
    Violation,
}

/// Evaluation result for one driver, as fed to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverEvaluation {
    pub metrics: DriverMetrics,
    pub violations: Vec<Violation>,
    pub status: ComplianceStatus,
}

/// A driver left out of fleet counts because its duty history was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedDriver {
    pub driver_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub available: usize,
    pub limited: usize,
    pub rest_required: usize,
    pub violation: usize,
}

impl BucketCounts {
    pub fn total(&self) -> usize {
        self.available + self.limited + self.rest_required + self.violation
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRow {
    pub driver_id: String,
    pub bucket: FleetBucket,
    pub status: ComplianceStatus,
    pub weekly_hours_used: f64,
    pub weekly_hours_available: f64,
    pub driving_hours_available: f64,
    pub violation_count: usize,
}

/// Fleet-wide compliance summary for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub evaluated_at: DateTime<Utc>,
    pub counts: BucketCounts,
    pub total_drivers: usize,
    pub average_hours_used_7d: f64,
    /// Mean share of the configured weekly limit already used (0-100%)
    pub average_utilization_percent: f64,
    pub drivers: Vec<DriverRow>,
    pub excluded: Vec<ExcludedDriver>,
}
