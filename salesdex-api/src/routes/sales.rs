//! Sales Analytics Endpoints
//!
//! - GET /most_sold_by_category
//! - GET /most_sold_by_country
//! - GET /top_client
//! - GET /categories/:category/top_products?limit=N
//! - GET /countries/:country/top_products?limit=N
//! - GET /categories/:category/top_clients?limit=N
//!
//! Queries run on the blocking pool since a first request may load the
//! datasets. Every response carries `x-cache: hit|miss|coalesced`.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::HeaderName,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use salesdex_analytics::{Operation, QueryRequest, SalesAnalytics};

use crate::error::ApiResult;
use crate::state::AppState;

pub const CACHE_HEADER: HeaderName = HeaderName::from_static("x-cache");

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/most_sold_by_category - Best seller of every category
pub async fn most_sold_by_category(
    State(analytics): State<Arc<SalesAnalytics>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::MostSoldByCategory, None, query).await
}

/// GET /api/most_sold_by_country - Best seller of every country
pub async fn most_sold_by_country(
    State(analytics): State<Arc<SalesAnalytics>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::MostSoldByCountry, None, query).await
}

/// GET /api/top_client - Client with the most distinct products
pub async fn top_client(
    State(analytics): State<Arc<SalesAnalytics>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::TopClient, None, query).await
}

/// GET /api/categories/:category/top_products - Ranked products of a category
pub async fn category_top_products(
    State(analytics): State<Arc<SalesAnalytics>>,
    Path(category): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::TopProductsByCategory, Some(category), query).await
}

/// GET /api/countries/:country/top_products - Ranked products of a country
pub async fn country_top_products(
    State(analytics): State<Arc<SalesAnalytics>>,
    Path(country): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::TopProductsByCountry, Some(country), query).await
}

/// GET /api/categories/:category/top_clients - Ranked clients of a category
pub async fn category_top_clients(
    State(analytics): State<Arc<SalesAnalytics>>,
    Path(category): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    run_query(analytics, Operation::TopClientsByCategory, Some(category), query).await
}

async fn run_query(
    analytics: Arc<SalesAnalytics>,
    operation: Operation,
    key: Option<String>,
    raw_query: Option<String>,
) -> ApiResult<Response> {
    let request =
        QueryRequest::from_query(operation, key.as_deref(), raw_query.as_deref().unwrap_or(""))?;
    let read = tokio::task::spawn_blocking(move || analytics.run(&request)).await??;

    let origin = read.origin().as_str();
    Ok(([(CACHE_HEADER, origin)], Json(read.into_value())).into_response())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/most_sold_by_category", get(most_sold_by_category))
        .route("/most_sold_by_country", get(most_sold_by_country))
        .route("/top_client", get(top_client))
        .route("/categories/:category/top_products", get(category_top_products))
        .route("/countries/:country/top_products", get(country_top_products))
        .route("/categories/:category/top_clients", get(category_top_clients))
}
