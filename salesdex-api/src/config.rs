//! API Configuration Module
//!
//! Bind address for the HTTP server, loaded from environment variables
//! with defaults for local development.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host or IP to bind.
    pub bind_host: String,
    /// TCP port to listen on.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SALESDEX_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT` or `SALESDEX_API_PORT`: Port (default: 5000)
    pub fn from_env() -> ApiResult<Self> {
        let bind_host =
            std::env::var("SALESDEX_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("SALESDEX_API_PORT").ok());
        Self::from_parts(bind_host, port.as_deref())
    }

    /// Build from a host and an optional raw port value.
    pub fn from_parts(bind_host: impl Into<String>, port: Option<&str>) -> ApiResult<Self> {
        let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_parameter(format!("Invalid port value: {}", raw)))?,
        };
        Ok(Self {
            bind_host: bind_host.into(),
            port,
        })
    }

    /// The socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_parameter(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}
