//! Salesdex Analytics - Aggregation Engine
//!
//! Read-only queries over a loaded [`salesdex_storage::Indices`] snapshot:
//!
//! - best-selling product per category and per country
//! - best client per category, and by number of distinct products bought
//! - whole-dataset overviews built from those
//!
//! Rankings are deterministic: equal totals always resolve to the lowest
//! identifier. [`SalesAnalytics`] wraps the engine with the load-once store
//! and the result cache.

mod ranking;

pub mod clients;
pub mod operation;
pub mod overview;
pub mod products;
pub mod service;

use std::fmt::Display;

use salesdex_core::{QueryError, SalesdexError, SalesdexResult};

pub use clients::{top_client_by_category, top_client_by_unique_products, top_clients_by_category};
pub use operation::Operation;
pub use overview::{most_sold_by_category, most_sold_by_country};
pub use products::{
    top_product_by_category, top_product_by_country, top_products_by_category,
    top_products_by_country,
};
pub use service::{QueryOutput, QueryRequest, SalesAnalytics};

pub(crate) fn empty_result(operation: &str, key: impl Display) -> SalesdexError {
    QueryError::EmptyResult {
        operation: operation.to_string(),
        key: key.to_string(),
    }
    .into()
}

pub(crate) fn non_empty<T>(
    ranked: Vec<T>,
    operation: &str,
    key: impl Display,
) -> SalesdexResult<Vec<T>> {
    if ranked.is_empty() {
        return Err(empty_result(operation, key));
    }
    Ok(ranked)
}

pub(crate) fn first<T>(ranked: Vec<T>, operation: &str, key: impl Display) -> SalesdexResult<T> {
    ranked
        .into_iter()
        .next()
        .ok_or_else(|| empty_result(operation, key))
}
