//! Immutable index set built once per successful load.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use salesdex_core::{
    Category, CategoryId, CategorySelector, Contact, ContactId, EntityIdType, Product, ProductId,
    QuantitySum, SaleRecord, SalesdexResult, StoreError,
};

use crate::loader::{ReferenceTables, SalesBatch};

/// Counts describing a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadSummary {
    pub sales_year: i32,
    pub categories: usize,
    pub products: usize,
    pub contacts: usize,
    pub sales: usize,
    pub skipped_out_of_year: usize,
    pub skipped_non_positive: usize,
}

/// Every collection and derived index of one loaded snapshot.
///
/// Sales are stored once; the per-category and per-country indices hold
/// positions into that vector. Nothing here is mutable once built.
#[derive(Debug, Clone, Default)]
pub struct Indices {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    contacts: BTreeMap<ContactId, Contact>,
    sales: Vec<SaleRecord>,
    by_category: HashMap<CategoryId, Vec<usize>>,
    by_country: BTreeMap<String, Vec<usize>>,
    by_client_per_category: BTreeMap<(CategoryId, ContactId), QuantitySum>,
    category_totals: BTreeMap<CategoryId, QuantitySum>,
    client_products: BTreeMap<ContactId, BTreeSet<ProductId>>,
    country_codes: BTreeMap<String, i64>,
    category_names: HashMap<String, CategoryId>,
    summary: LoadSummary,
}

impl Indices {
    /// Derive all indices from the loaded tables and sales.
    ///
    /// Every sale must reference a product and contact present in `tables`.
    /// The sales loader already rejects lines that do not, so a miss here
    /// fails the whole build with `UnresolvedReference`.
    pub(crate) fn build(
        tables: ReferenceTables,
        batch: SalesBatch,
        sales_year: i32,
    ) -> SalesdexResult<Self> {
        let ReferenceTables {
            categories,
            products,
            contacts,
            country_codes,
        } = tables;

        let mut category_names: HashMap<String, CategoryId> = HashMap::new();
        // BTreeMap iteration is ascending, so the first id seen for a name is the lowest.
        for category in categories.values() {
            category_names
                .entry(category.name.clone())
                .or_insert(category.category_id);
        }

        let mut by_category: HashMap<CategoryId, Vec<usize>> = HashMap::new();
        let mut by_country: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_client_per_category: BTreeMap<(CategoryId, ContactId), QuantitySum> =
            BTreeMap::new();
        let mut category_totals: BTreeMap<CategoryId, QuantitySum> = BTreeMap::new();
        let mut client_products: BTreeMap<ContactId, BTreeSet<ProductId>> = BTreeMap::new();

        for (position, sale) in batch.records.iter().enumerate() {
            let product = products
                .get(&sale.product_id)
                .ok_or_else(|| unresolved(sale, sale.product_id))?;
            let contact = contacts
                .get(&sale.contact_id)
                .ok_or_else(|| unresolved(sale, sale.contact_id))?;
            let category_id = product.category_id;

            by_category.entry(category_id).or_default().push(position);
            by_country
                .entry(contact.country.name.clone())
                .or_default()
                .push(position);
            *by_client_per_category
                .entry((category_id, sale.contact_id))
                .or_default() += sale.quantity;
            *category_totals.entry(category_id).or_default() += sale.quantity;
            client_products
                .entry(sale.contact_id)
                .or_default()
                .insert(sale.product_id);
        }

        let summary = LoadSummary {
            sales_year,
            categories: categories.len(),
            products: products.len(),
            contacts: contacts.len(),
            sales: batch.records.len(),
            skipped_out_of_year: batch.skipped_out_of_year,
            skipped_non_positive: batch.skipped_non_positive,
        };

        Ok(Self {
            categories,
            products,
            contacts,
            sales: batch.records,
            by_category,
            by_country,
            by_client_per_category,
            category_totals,
            client_products,
            country_codes,
            category_names,
            summary,
        })
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn categories(&self) -> &BTreeMap<CategoryId, Category> {
        &self.categories
    }

    pub fn products(&self) -> &BTreeMap<ProductId, Product> {
        &self.products
    }

    pub fn contacts(&self) -> &BTreeMap<ContactId, Contact> {
        &self.contacts
    }

    pub fn sales(&self) -> &[SaleRecord] {
        &self.sales
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// Resolve a selector to a loaded category id.
    ///
    /// A name shared by several categories resolves to the lowest id.
    pub fn resolve_category(&self, selector: &CategorySelector) -> Option<CategoryId> {
        match selector {
            CategorySelector::Id(id) => self.categories.contains_key(id).then_some(*id),
            CategorySelector::Name(name) => self.category_names.get(name).copied(),
        }
    }

    /// Sales whose product belongs to the category.
    pub fn sales_in_category(&self, id: CategoryId) -> impl Iterator<Item = &SaleRecord> + '_ {
        self.positions(self.by_category.get(&id))
    }

    /// Sales whose client lives in the named country (exact match).
    pub fn sales_in_country<'a>(&'a self, country: &str) -> impl Iterator<Item = &'a SaleRecord> + 'a {
        self.positions(self.by_country.get(country))
    }

    /// Names of countries with at least one sale, ascending.
    pub fn countries(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_country.keys().map(String::as_str)
    }

    /// Categories with at least one sale and their total quantity, by id.
    pub fn category_totals(&self) -> impl Iterator<Item = (CategoryId, QuantitySum)> + '_ {
        self.category_totals.iter().map(|(id, total)| (*id, *total))
    }

    pub fn category_total(&self, id: CategoryId) -> Option<QuantitySum> {
        self.category_totals.get(&id).copied()
    }

    /// Quantity bought per client within one category, by contact id.
    pub fn client_totals_in_category(
        &self,
        id: CategoryId,
    ) -> impl Iterator<Item = (ContactId, QuantitySum)> + '_ {
        let lower = (id, ContactId::new(i64::MIN));
        let upper = (id, ContactId::new(i64::MAX));
        self.by_client_per_category
            .range(lower..=upper)
            .map(|((_, contact_id), total)| (*contact_id, *total))
    }

    /// Distinct products bought per client, by contact id.
    pub fn client_products(&self) -> impl Iterator<Item = (ContactId, &BTreeSet<ProductId>)> + '_ {
        self.client_products.iter().map(|(id, products)| (*id, products))
    }

    /// Source code for a country name; `None` for the unknown country.
    pub fn country_code(&self, country: &str) -> Option<i64> {
        self.country_codes.get(country).copied()
    }

    fn positions<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a SaleRecord> + 'a {
        positions
            .into_iter()
            .flatten()
            .filter_map(move |&position| self.sales.get(position))
    }
}

fn unresolved<K: EntityIdType + Into<i64>>(sale: &SaleRecord, id: K) -> StoreError {
    StoreError::UnresolvedReference {
        sale_id: sale.sale_id.get(),
        entity: K::ENTITY_NAME,
        id: id.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use salesdex_core::{Country, SaleId};

    fn tables() -> ReferenceTables {
        let mut tables = ReferenceTables::default();
        for (id, name) in [(1, "Desks"), (2, "Chairs"), (3, "Desks")] {
            tables.categories.insert(
                CategoryId::new(id),
                Category {
                    category_id: CategoryId::new(id),
                    name: name.to_string(),
                    parent_name: None,
                },
            );
        }
        for (id, category) in [(10, 1), (11, 1), (20, 2)] {
            tables.products.insert(
                ProductId::new(id),
                Product {
                    product_id: ProductId::new(id),
                    category_id: CategoryId::new(category),
                    name: format!("product {id}"),
                    unit_price: 1.0,
                },
            );
        }
        for (id, country) in [(100, Some(("Belgium", 21))), (101, None)] {
            tables.contacts.insert(
                ContactId::new(id),
                Contact {
                    contact_id: ContactId::new(id),
                    name: format!("client {id}"),
                    country: country
                        .map(|(name, code)| Country::new(name, code))
                        .unwrap_or_else(Country::unknown),
                },
            );
        }
        tables.country_codes.insert("Belgium".to_string(), 21);
        tables
    }

    fn sale(id: i64, product: i64, contact: i64, quantity: f64) -> SaleRecord {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SaleRecord::new(
            SaleId::new(id),
            ContactId::new(contact),
            ProductId::new(product),
            quantity,
            1.0,
            at,
        )
    }

    fn indices() -> Indices {
        let batch = SalesBatch {
            records: vec![
                sale(1, 10, 100, 2.0),
                sale(2, 11, 101, 3.0),
                sale(3, 20, 100, 5.0),
                sale(4, 10, 100, 1.0),
            ],
            skipped_out_of_year: 4,
            skipped_non_positive: 1,
        };
        Indices::build(tables(), batch, 2024).unwrap()
    }

    #[test]
    fn test_category_and_country_indices() {
        let indices = indices();
        let desks: Vec<_> = indices
            .sales_in_category(CategoryId::new(1))
            .map(|s| s.sale_id.get())
            .collect();
        assert_eq!(desks, vec![1, 2, 4]);
        assert_eq!(indices.sales_in_category(CategoryId::new(3)).count(), 0);

        assert_eq!(indices.countries().collect::<Vec<_>>(), vec!["Belgium", "Unknown"]);
        assert_eq!(indices.sales_in_country("Belgium").count(), 3);
        assert_eq!(indices.sales_in_country("belgium").count(), 0);
        assert_eq!(indices.country_code("Belgium"), Some(21));
        assert_eq!(indices.country_code("Unknown"), None);
    }

    #[test]
    fn test_client_totals_are_restricted_to_the_category() {
        let indices = indices();
        let totals: Vec<_> = indices
            .client_totals_in_category(CategoryId::new(1))
            .map(|(id, total)| (id.get(), total.to_f64()))
            .collect();
        assert_eq!(totals, vec![(100, 3.0), (101, 3.0)]);
        assert_eq!(indices.category_total(CategoryId::new(1)), Some(QuantitySum::of(6.0)));
        assert_eq!(indices.category_total(CategoryId::new(2)), Some(QuantitySum::of(5.0)));
        assert_eq!(indices.category_total(CategoryId::new(3)), None);
    }

    #[test]
    fn test_client_products_are_distinct() {
        let indices = indices();
        let counts: Vec<_> = indices
            .client_products()
            .map(|(id, products)| (id.get(), products.len()))
            .collect();
        assert_eq!(counts, vec![(100, 2), (101, 1)]);
    }

    #[test]
    fn test_resolve_category() {
        let indices = indices();
        assert_eq!(
            indices.resolve_category(&CategorySelector::Name("Desks".to_string())),
            Some(CategoryId::new(1))
        );
        assert_eq!(
            indices.resolve_category(&CategorySelector::Id(CategoryId::new(3))),
            Some(CategoryId::new(3))
        );
        assert_eq!(indices.resolve_category(&CategorySelector::Id(CategoryId::new(9))), None);
        assert_eq!(indices.resolve_category(&"Lamps".into()), None);
    }

    #[test]
    fn test_unresolved_reference_fails_the_build() {
        let batch = SalesBatch {
            records: vec![sale(1, 10, 100, 2.0), sale(2, 99, 100, 1.0)],
            ..SalesBatch::default()
        };
        let err = Indices::build(tables(), batch, 2024).unwrap_err();
        assert_eq!(
            err,
            salesdex_core::SalesdexError::from(StoreError::UnresolvedReference {
                sale_id: 2,
                entity: "product",
                id: 99,
            })
        );

        let batch = SalesBatch {
            records: vec![sale(3, 10, 555, 1.0)],
            ..SalesBatch::default()
        };
        let err = Indices::build(tables(), batch, 2024).unwrap_err();
        assert!(err.to_string().contains("unknown contact 555"));
    }

    #[test]
    fn test_summary() {
        let summary = *indices().summary();
        assert_eq!(summary.categories, 3);
        assert_eq!(summary.products, 3);
        assert_eq!(summary.contacts, 2);
        assert_eq!(summary.sales, 4);
        assert_eq!(summary.skipped_out_of_year, 4);
        assert_eq!(summary.skipped_non_positive, 1);
    }
}
