//! REST API Routes Module
//!
//! - `/api/*` sales analytics queries
//! - `/health/*` liveness and readiness

pub mod health;
pub mod sales;

use std::sync::Arc;

use axum::Router;
use salesdex_analytics::SalesAnalytics;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use health::create_router as health_router;
pub use sales::create_router as sales_router;

/// Build the full application router over a query service.
pub fn create_api_router(analytics: Arc<SalesAnalytics>) -> Router {
    let state = AppState::new(analytics);

    Router::new()
        .nest("/api", sales::create_router())
        .nest("/health", health::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
