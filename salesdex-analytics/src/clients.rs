//! Top clients per category and by product variety.

use salesdex_core::{
    CategorySelector, ClientTotal, ContactId, Limit, SalesdexResult, UniqueProductsLeader,
};
use salesdex_storage::Indices;

use crate::ranking::rank;
use crate::{empty_result, first, non_empty};

/// The client with the highest quantity bought in a category.
///
/// Ties go to the lowest contact id. Fails with `EmptyResult` when the
/// category is unknown or has no sales.
pub fn top_client_by_category(
    indices: &Indices,
    category: &CategorySelector,
) -> SalesdexResult<ClientTotal> {
    let operation = "top_client_by_category";
    let ranked = ranked_in_category(indices, category, Limit::default(), operation)?;
    first(ranked, operation, category)
}

/// Up to `limit` clients of a category, by quantity bought.
pub fn top_clients_by_category(
    indices: &Indices,
    category: &CategorySelector,
    limit: Limit,
) -> SalesdexResult<Vec<ClientTotal>> {
    ranked_in_category(indices, category, limit, "top_clients_by_category")
}

/// The client that bought the most distinct products.
///
/// Ties go to the lowest contact id. Fails with `EmptyResult` when there
/// are no sales at all.
pub fn top_client_by_unique_products(indices: &Indices) -> SalesdexResult<UniqueProductsLeader> {
    indices
        .client_products()
        .filter_map(|(contact_id, products)| {
            indices
                .contact(contact_id)
                .map(|contact| (contact, products.len()))
        })
        .max_by(|(a, a_count), (b, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| b.contact_id.cmp(&a.contact_id))
        })
        .map(|(contact, unique_products)| UniqueProductsLeader {
            contact: contact.clone(),
            unique_products,
        })
        .ok_or_else(|| empty_result("top_client", "all"))
}

fn ranked_in_category(
    indices: &Indices,
    category: &CategorySelector,
    limit: Limit,
    operation: &str,
) -> SalesdexResult<Vec<ClientTotal>> {
    let category_id = indices
        .resolve_category(category)
        .ok_or_else(|| empty_result(operation, category))?;
    let ranked = rank(indices.client_totals_in_category(category_id));
    non_empty(client_totals(indices, ranked, limit), operation, category)
}

fn client_totals(indices: &Indices, ranked: Vec<(ContactId, f64)>, limit: Limit) -> Vec<ClientTotal> {
    ranked
        .into_iter()
        .filter_map(|(contact_id, total_quantity)| {
            indices.contact(contact_id).map(|contact| ClientTotal {
                contact: contact.clone(),
                total_quantity,
            })
        })
        .take(limit.get())
        .collect()
}
