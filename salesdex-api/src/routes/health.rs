//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health/ready - 200 once the datasets are loaded, 503 before

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use salesdex_storage::{CacheStats, LoadStats};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub load: LoadStats,
    pub cache: CacheStats,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/ready - Readiness check (datasets loaded)
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, status) = if state.analytics.is_ready() {
        (StatusCode::OK, HealthStatus::Healthy)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy)
    };

    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        load: state.analytics.load_stats(),
        cache: state.analytics.cache_stats(),
    };
    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/ready", get(readiness))
}
