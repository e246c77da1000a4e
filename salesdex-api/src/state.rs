//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;
use salesdex_analytics::SalesAnalytics;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Cached query service over the load-once store.
    pub analytics: Arc<SalesAnalytics>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(analytics: Arc<SalesAnalytics>) -> Self {
        Self {
            analytics,
            start_time: Instant::now(),
        }
    }
}

impl FromRef<AppState> for Arc<SalesAnalytics> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.analytics)
    }
}
