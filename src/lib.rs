//! hos-engine: Hours-of-Service compliance for delivery fleets
//!
//! Rolling-window evaluation of the FMCSA property-carrying limits and
//! prediction of the first violation a planned schedule would cause.
//!
//! ## Architecture
//!
//! - **Engine** (`hos`): pure per-driver evaluation and prediction against a `PolicyWindow`
//! - **Fleet** (`fleet`): parallel evaluation and dashboard buckets
//! - **Reporting** (`reporting`): status badge and 60/7 or 70/8 cycle grid
//! - **Scheduling** (`scheduling`): conflict list and alternative drivers
//! - **Config** (`config`): TOML carrier configuration resolved into a `PolicyWindow`
//! - **API** (`api`): thin axum JSON layer over the above

pub mod api;
pub mod config;
pub mod fleet;
pub mod hos;
pub mod regulations;
pub mod reporting;
pub mod scheduling;
pub mod types;

// Re-export configuration
pub use config::HosConfig;

// Re-export the engine entry points
pub use hos::{evaluate, evaluate_records, predict, HosError, PolicyWindow};

// Re-export commonly used types
pub use types::{
    AttendanceRecord, ComplianceStatus, DriverHistory, DriverMetrics, DutySegment, DutyStatus,
    FleetSummary, PlannedSegment, Prediction, Severity, Violation, ViolationType, WeeklyCycle,
};
