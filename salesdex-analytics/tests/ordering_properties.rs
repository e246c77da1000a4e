//! Property tests: rankings do not depend on input order and ties go to
//! the lowest id.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use salesdex_analytics::{
    top_client_by_category, top_client_by_unique_products, top_product_by_category,
    top_products_by_country,
};
use salesdex_core::{CategoryId, CategorySelector, Limit, MAX_LIMIT};
use salesdex_storage::{DataStore, Indices, LoadSettings};
use salesdex_test_utils::generators::{arb_sale_lines, fixture_from_lines, SaleLine};

const PRODUCTS: usize = 6;
const CLIENTS: usize = 5;

fn load(lines: &[SaleLine]) -> Arc<Indices> {
    let sources = fixture_from_lines(PRODUCTS, CLIENTS, lines).into_sources();
    DataStore::new(Arc::new(sources), LoadSettings::default())
        .ensure_loaded()
        .unwrap()
}

fn everything() -> CategorySelector {
    CategoryId::new(1).into()
}

/// Generated quantities are whole tenths, so a scan over integer tenths is exact.
fn tenths(quantity: f64) -> i64 {
    (quantity * 10.0).round() as i64
}

/// Expected leader from a plain scan: highest total, lowest id on ties.
fn expected_leader(totals: &BTreeMap<i64, i64>) -> (i64, f64) {
    let mut best = (0, i64::MIN);
    for (id, total) in totals {
        if *total > best.1 {
            best = (*id, *total);
        }
    }
    (best.0, best.1 as f64 / 10.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_reversed_input_gives_same_answers(lines in arb_sale_lines(PRODUCTS, CLIENTS, 40)) {
        let forward = load(&lines);
        let mut reversed_lines = lines.clone();
        reversed_lines.reverse();
        let backward = load(&reversed_lines);

        prop_assert_eq!(
            top_product_by_category(&forward, &everything()).unwrap(),
            top_product_by_category(&backward, &everything()).unwrap()
        );
        prop_assert_eq!(
            top_client_by_category(&forward, &everything()).unwrap(),
            top_client_by_category(&backward, &everything()).unwrap()
        );
        prop_assert_eq!(
            top_client_by_unique_products(&forward).unwrap(),
            top_client_by_unique_products(&backward).unwrap()
        );
        let limit = Limit::new(MAX_LIMIT).unwrap();
        prop_assert_eq!(
            top_products_by_country(&forward, "North", limit).ok(),
            top_products_by_country(&backward, "North", limit).ok()
        );
    }

    #[test]
    fn prop_top_product_matches_a_plain_scan(lines in arb_sale_lines(PRODUCTS, CLIENTS, 40)) {
        let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
        for (product, _, quantity) in &lines {
            *totals.entry(*product as i64 + 1).or_default() += tenths(*quantity);
        }
        let (id, total) = expected_leader(&totals);

        let top = top_product_by_category(&load(&lines), &everything()).unwrap();
        prop_assert_eq!(top.product.product_id.get(), id);
        prop_assert_eq!(top.total_quantity, total);
    }

    #[test]
    fn prop_top_client_matches_a_plain_scan(lines in arb_sale_lines(PRODUCTS, CLIENTS, 40)) {
        let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
        for (_, client, quantity) in &lines {
            *totals.entry(*client as i64 + 1).or_default() += tenths(*quantity);
        }
        let (id, total) = expected_leader(&totals);

        let top = top_client_by_category(&load(&lines), &everything()).unwrap();
        prop_assert_eq!(top.contact.contact_id.get(), id);
        prop_assert_eq!(top.total_quantity, total);
    }

    #[test]
    fn prop_equal_totals_resolve_to_lowest_id(
        whole in 2u32..500,
        cut in 1u32..499,
        first in 0usize..PRODUCTS,
        second in 0usize..PRODUCTS,
    ) {
        prop_assume!(first != second && cut < whole);
        // `second` sells the same total as `first`, split over two lines.
        let lines = vec![
            (second, 0, f64::from(cut) / 10.0),
            (first, 1, f64::from(whole) / 10.0),
            (second, 2, f64::from(whole - cut) / 10.0),
        ];
        for ordering in [lines.clone(), lines.into_iter().rev().collect()] {
            let top = top_product_by_category(&load(&ordering), &everything()).unwrap();
            prop_assert_eq!(top.product.product_id.get(), first.min(second) as i64 + 1);
        }
    }
}
