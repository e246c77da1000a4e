//! Whole-dataset overviews: best seller of every category and country.

use salesdex_core::{CategoryLeader, CountryLeader, SalesdexResult};
use salesdex_storage::Indices;

use crate::products::{top_product_by_category, top_product_by_country};

/// Best seller of every category with sales.
///
/// Ordered by category total descending, then category id ascending. Empty
/// when nothing was sold.
pub fn most_sold_by_category(indices: &Indices) -> SalesdexResult<Vec<CategoryLeader>> {
    let mut leaders = Vec::new();
    for (category_id, category_total) in indices.category_totals() {
        let Some(category) = indices.category(category_id) else {
            continue;
        };
        let top_product = top_product_by_category(indices, &category_id.into())?;
        let leader = CategoryLeader {
            category: category.clone(),
            top_product,
            category_total: category_total.to_f64(),
        };
        leaders.push((category_total, leader));
    }
    // `category_totals` yields ascending ids and the sort is stable.
    leaders.sort_by(|(a, _), (b, _)| b.cmp(a));
    Ok(leaders.into_iter().map(|(_, leader)| leader).collect())
}

/// Best seller of every country with sales, ordered by country name.
///
/// Clients without a country are reported under "Unknown" with no code.
pub fn most_sold_by_country(indices: &Indices) -> SalesdexResult<Vec<CountryLeader>> {
    indices
        .countries()
        .map(|country| {
            Ok(CountryLeader {
                country: country.to_string(),
                country_code: indices.country_code(country),
                top_product: top_product_by_country(indices, country)?,
            })
        })
        .collect()
}
