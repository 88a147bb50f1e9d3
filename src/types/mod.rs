//! Shared data structures for Hours-of-Service compliance
//!
//! - Duty model: DutyStatus, DutySegment, AttendanceRecord, PlannedSegment
//! - Compliance outputs: DriverMetrics, Violation, Prediction, ComplianceStatus
//! - Fleet aggregation: FleetSummary, FleetBucket, DriverEvaluation

mod duty;
mod compliance;
mod fleet;

pub use duty::*;
pub use compliance::*;
pub use fleet::*;
