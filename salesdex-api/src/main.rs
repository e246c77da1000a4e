//! Salesdex API Server Entry Point
//!
//! Reads configuration, loads the datasets, and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use salesdex_analytics::SalesAnalytics;
use salesdex_api::telemetry::init_tracing;
use salesdex_api::{create_api_router, ApiConfig, ApiError, ApiResult};
use salesdex_core::SalesdexConfig;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing()?;

    let config = SalesdexConfig::from_env();
    config
        .validate()
        .map_err(|e| ApiError::internal_error(format!("Invalid configuration: {}", e)))?;
    let api_config = ApiConfig::from_env()?;

    let analytics = Arc::new(SalesAnalytics::from_config(&config));

    // A failed load is logged and retried on the first query.
    let warm = Arc::clone(&analytics);
    match tokio::task::spawn_blocking(move || warm.warm_up()).await? {
        Ok(summary) => tracing::info!(
            sales = summary.sales,
            sales_year = summary.sales_year,
            "Datasets loaded"
        ),
        Err(e) => tracing::error!(error = %e, "Initial dataset load failed"),
    }

    let app: Router = create_api_router(analytics);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting salesdex API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
