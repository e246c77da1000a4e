//! Salesdex API - HTTP Layer
//!
//! A thin axum surface over [`salesdex_analytics::SalesAnalytics`]: handlers
//! parse the path key and query string, run the cached query on the blocking
//! pool, and map library errors to HTTP statuses.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
