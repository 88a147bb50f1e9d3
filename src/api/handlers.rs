//! API handlers
//!
//! Thin adapters from JSON requests to the engine. The evaluation instant
//! defaults to the server clock here and nowhere else.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::defaults::DEFAULT_ALTERNATIVES_LIMIT;
use crate::config::{ConfigError, HosConfig};
use crate::fleet::{evaluate_driver, evaluate_fleet};
use crate::hos::{self, history_segments, PolicyWindow};
use crate::regulations::{self, RuleReference};
use crate::reporting::cycle_grid;
use crate::scheduling::{check_assignments, suggest_alternatives, Assignment};
use crate::types::{
    AttendanceRecord, ComplianceStatus, DriverHistory, DriverMetrics, DutySegment, PlannedSegment,
    Prediction, Violation, WeeklyCycle,
};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct ApiState {
    pub policy: Arc<PolicyWindow>,
    pub carrier: Arc<str>,
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(policy: PolicyWindow, carrier: &str) -> Self {
        Self {
            policy: Arc::new(policy),
            carrier: Arc::from(carrier),
            started_at: Utc::now(),
        }
    }

    pub fn from_config(config: &HosConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.policy()?, &config.carrier.name))
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DriverRequest {
    pub driver_id: String,
    #[serde(default)]
    pub segments: Vec<DutySegment>,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    pub evaluation_instant: Option<DateTime<Utc>>,
}

impl DriverRequest {
    fn history(self) -> (DriverHistory, DateTime<Utc>) {
        let at = self.evaluation_instant.unwrap_or_else(Utc::now);
        let history = DriverHistory {
            driver_id: self.driver_id,
            segments: self.segments,
            records: self.records,
        };
        (history, at)
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub driver: DriverRequest,
    pub planned: Vec<PlannedSegment>,
}

#[derive(Debug, Deserialize)]
pub struct FleetRequest {
    pub drivers: Vec<DriverHistory>,
    pub evaluation_instant: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ConflictsRequest {
    pub assignments: Vec<Assignment>,
    pub evaluation_instant: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AlternativesRequest {
    pub candidates: Vec<DriverHistory>,
    pub planned: Vec<PlannedSegment>,
    pub evaluation_instant: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DriverReport {
    pub metrics: DriverMetrics,
    pub violations: Vec<Violation>,
    pub status: ComplianceStatus,
    pub explanations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub driver_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub prediction: Option<Prediction>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub carrier: String,
    pub weekly_cycle: WeeklyCycle,
    pub time_zone: &'static str,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub rules: Vec<RuleReference>,
    pub restart: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health
pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        carrier: state.carrier.to_string(),
        weekly_cycle: state.policy.weekly_cycle,
        time_zone: state.policy.time_zone.name(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/v1/policy
pub async fn policy(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(state.policy.as_ref())
}

/// GET /api/v1/rules
pub async fn rules() -> Response {
    ApiResponse::ok(RulesResponse {
        rules: regulations::all_rules(),
        restart: regulations::RESTART_SUMMARY,
    })
}

/// POST /api/v1/drivers/evaluate
pub async fn evaluate_driver_handler(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<DriverRequest>,
) -> Response {
    let (history, at) = request.history();
    match evaluate_driver(&history, at, &state.policy) {
        Ok(eval) => {
            let explanations = eval.violations.iter().map(regulations::explain).collect();
            ApiResponse::ok(DriverReport {
                metrics: eval.metrics,
                violations: eval.violations,
                status: eval.status,
                explanations,
            })
        }
        Err(e) => ApiErrorResponse::from_hos(&e),
    }
}

/// POST /api/v1/drivers/predict
pub async fn predict_driver(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<PredictRequest>,
) -> Response {
    let planned = request.planned;
    let (history, at) = request.driver.history();
    let result = history_segments(&history.driver_id, &history.segments, &history.records)
        .and_then(|segments| hos::predict(&history.driver_id, &segments, &planned, at, &state.policy));
    match result {
        Ok(prediction) => ApiResponse::ok(PredictionReport {
            driver_id: history.driver_id,
            evaluated_at: at,
            prediction,
        }),
        Err(e) => ApiErrorResponse::from_hos(&e),
    }
}

/// POST /api/v1/drivers/grid
pub async fn driver_grid(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<DriverRequest>,
) -> Response {
    let (history, at) = request.history();
    let result = history_segments(&history.driver_id, &history.segments, &history.records)
        .and_then(|segments| cycle_grid(&history.driver_id, &segments, at, &state.policy));
    match result {
        Ok(grid) => ApiResponse::ok(grid),
        Err(e) => ApiErrorResponse::from_hos(&e),
    }
}

/// POST /api/v1/fleet/evaluate
pub async fn fleet_evaluate(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<FleetRequest>,
) -> Response {
    let at = request.evaluation_instant.unwrap_or_else(Utc::now);
    let policy = Arc::clone(&state.policy);
    let drivers = request.drivers;
    match tokio::task::spawn_blocking(move || evaluate_fleet(&drivers, at, &policy)).await {
        Ok(summary) => ApiResponse::ok(summary),
        Err(e) => ApiErrorResponse::internal(format!("Fleet evaluation task failed: {e}")),
    }
}

/// POST /api/v1/schedule/conflicts
pub async fn schedule_conflicts(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<ConflictsRequest>,
) -> Response {
    let at = request.evaluation_instant.unwrap_or_else(Utc::now);
    let policy = Arc::clone(&state.policy);
    let assignments = request.assignments;
    match tokio::task::spawn_blocking(move || check_assignments(&assignments, at, &policy)).await {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => ApiErrorResponse::internal(format!("Conflict check task failed: {e}")),
    }
}

/// POST /api/v1/schedule/alternatives
pub async fn schedule_alternatives(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<AlternativesRequest>,
) -> Response {
    if request.planned.is_empty() {
        return ApiErrorResponse::bad_request("planned shift must contain at least one segment");
    }
    let at = request.evaluation_instant.unwrap_or_else(Utc::now);
    let limit = request.limit.unwrap_or(DEFAULT_ALTERNATIVES_LIMIT);
    let policy = Arc::clone(&state.policy);
    let AlternativesRequest { candidates, planned, .. } = request;
    match tokio::task::spawn_blocking(move || {
        suggest_alternatives(&candidates, &planned, at, &policy, limit)
    })
    .await
    {
        Ok(alternatives) => ApiResponse::ok(alternatives),
        Err(e) => ApiErrorResponse::internal(format!("Alternative search task failed: {e}")),
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    ApiErrorResponse::not_found("No such endpoint")
}
