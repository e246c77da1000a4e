//! Best-selling products per category and per country.

use salesdex_core::{CategorySelector, Limit, ProductId, ProductTotal, SalesdexResult};
use salesdex_storage::Indices;

use crate::{empty_result, first, non_empty};
use crate::ranking::rank;

/// The product with the highest quantity sold in a category.
///
/// Ties go to the lowest product id. Fails with `EmptyResult` when the
/// category is unknown or has no sales.
pub fn top_product_by_category(
    indices: &Indices,
    category: &CategorySelector,
) -> SalesdexResult<ProductTotal> {
    let operation = "top_product_by_category";
    let ranked = ranked_in_category(indices, category, Limit::default(), operation)?;
    first(ranked, operation, category)
}

/// Up to `limit` products of a category, by quantity sold.
pub fn top_products_by_category(
    indices: &Indices,
    category: &CategorySelector,
    limit: Limit,
) -> SalesdexResult<Vec<ProductTotal>> {
    ranked_in_category(indices, category, limit, "top_products_by_category")
}

/// The product with the highest quantity sold to clients of a country.
///
/// The country name must match exactly. Ties go to the lowest product id.
pub fn top_product_by_country(indices: &Indices, country: &str) -> SalesdexResult<ProductTotal> {
    let operation = "top_product_by_country";
    let ranked = ranked_in_country(indices, country, Limit::default(), operation)?;
    first(ranked, operation, country)
}

/// Up to `limit` products of a country, by quantity sold.
pub fn top_products_by_country(
    indices: &Indices,
    country: &str,
    limit: Limit,
) -> SalesdexResult<Vec<ProductTotal>> {
    ranked_in_country(indices, country, limit, "top_products_by_country")
}

fn ranked_in_category(
    indices: &Indices,
    category: &CategorySelector,
    limit: Limit,
    operation: &str,
) -> SalesdexResult<Vec<ProductTotal>> {
    let category_id = indices
        .resolve_category(category)
        .ok_or_else(|| empty_result(operation, category))?;
    let ranked = rank(
        indices
            .sales_in_category(category_id)
            .map(|sale| (sale.product_id, sale.quantity)),
    );
    non_empty(product_totals(indices, ranked, limit), operation, category)
}

fn ranked_in_country(
    indices: &Indices,
    country: &str,
    limit: Limit,
    operation: &str,
) -> SalesdexResult<Vec<ProductTotal>> {
    let ranked = rank(
        indices
            .sales_in_country(country)
            .map(|sale| (sale.product_id, sale.quantity)),
    );
    non_empty(product_totals(indices, ranked, limit), operation, country)
}

pub(crate) fn product_totals(
    indices: &Indices,
    ranked: Vec<(ProductId, f64)>,
    limit: Limit,
) -> Vec<ProductTotal> {
    ranked
        .into_iter()
        .filter_map(|(product_id, total_quantity)| {
            indices.product(product_id).map(|product| ProductTotal {
                product: product.clone(),
                total_quantity,
            })
        })
        .take(limit.get())
        .collect()
}
