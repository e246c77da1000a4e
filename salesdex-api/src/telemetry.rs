//! Tracing Subscriber Initialization
//!
//! JSON log lines filtered by `RUST_LOG`, with a default that keeps the API
//! and request traces at debug and the loaders at info.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_FILTER: &str = "salesdex_api=debug,salesdex_storage=info,tower_http=debug,info";

/// Install the global tracing subscriber. Fails if one is already set.
pub fn init_tracing() -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))
}
