//! API route definitions
//!
//! - /health, /policy, /rules: service and reference data
//! - /drivers/*: single-driver evaluation, prediction and cycle grid
//! - /fleet/evaluate: dashboard summary
//! - /schedule/*: conflict checks and alternative drivers

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/policy", get(handlers::policy))
        .route("/rules", get(handlers::rules))
        // Drivers
        .route("/drivers/evaluate", post(handlers::evaluate_driver_handler))
        .route("/drivers/predict", post(handlers::predict_driver))
        .route("/drivers/grid", post(handlers::driver_grid))
        // Fleet
        .route("/fleet/evaluate", post(handlers::fleet_evaluate))
        // Scheduling
        .route("/schedule/conflicts", post(handlers::schedule_conflicts))
        .route("/schedule/alternatives", post(handlers::schedule_alternatives))
        .with_state(state)
}
