//! Salesdex Test Utilities
//!
//! Shared test infrastructure for the salesdex workspace:
//! - A dataset fixture builder producing the four JSON documents
//! - A reference dataset with hand-checked answers
//! - Proptest generators for sales lines and query keys
//! - Assertions for salesdex error kinds

// Re-export in-memory sources from their source crate
pub use salesdex_storage::InMemorySources;

// Re-export core types for convenience
pub use salesdex_core::{
    CategoryId, CategorySelector, ContactId, DatasetKind, LoadError, ProductId, QueryError,
    SaleId, SalesdexConfig, SalesdexError, SalesdexResult, StoreError,
};

use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Sale date used when a test does not care about it.
pub const DEFAULT_SALE_DATE: &str = "2024-03-15 10:00:00";

// ============================================================================
// DATASET FIXTURE BUILDER
// ============================================================================

/// Builder for the four dataset documents.
///
/// Records are written in the source export format: references as
/// `[id, "name"]` pairs, sales as sale order lines.
#[derive(Debug, Clone, Default)]
pub struct DatasetFixture {
    categories: Vec<Value>,
    products: Vec<Value>,
    contacts: Vec<Value>,
    sales: Vec<Value>,
    overrides: HashMap<DatasetKind, String>,
}

impl DatasetFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level category.
    pub fn category(mut self, id: i64, name: &str) -> Self {
        self.categories
            .push(json!({"id": id, "name": name, "parent_id": false}));
        self
    }

    /// Add a category under a parent.
    pub fn child_category(mut self, id: i64, name: &str, parent_id: i64, parent_name: &str) -> Self {
        self.categories
            .push(json!({"id": id, "name": name, "parent_id": [parent_id, parent_name]}));
        self
    }

    pub fn product(mut self, id: i64, category_id: i64, name: &str, list_price: f64) -> Self {
        self.products.push(json!({
            "id": id,
            "name": name,
            "categ_id": [category_id, format!("category {category_id}")],
            "list_price": list_price,
        }));
        self
    }

    /// Add a contact; `country` is `(code, name)`, or `None` for no country.
    pub fn contact(mut self, id: i64, name: &str, country: Option<(i64, &str)>) -> Self {
        let country_id = match country {
            Some((code, country)) => json!([code, country]),
            None => json!(false),
        };
        self.contacts
            .push(json!({"id": id, "name": name, "country_id": country_id}));
        self
    }

    /// Add a sale line dated [`DEFAULT_SALE_DATE`].
    pub fn sale(self, id: i64, product_id: i64, contact_id: i64, quantity: f64) -> Self {
        self.sale_on(id, product_id, contact_id, quantity, DEFAULT_SALE_DATE)
    }

    pub fn sale_on(
        mut self,
        id: i64,
        product_id: i64,
        contact_id: i64,
        quantity: f64,
        create_date: &str,
    ) -> Self {
        self.sales.push(json!({
            "id": id,
            "product_id": [product_id, format!("product {product_id}")],
            "order_partner_id": [contact_id, format!("contact {contact_id}")],
            "product_uom_qty": quantity,
            "create_date": create_date,
        }));
        self
    }

    /// Add a sale line exactly as given, for malformed-record tests.
    pub fn raw_sale(mut self, record: Value) -> Self {
        self.sales.push(record);
        self
    }

    /// Serve `document` verbatim for a dataset instead of the built records.
    pub fn document(mut self, kind: DatasetKind, document: impl Into<String>) -> Self {
        self.overrides.insert(kind, document.into());
        self
    }

    /// Number of sale lines added.
    pub fn sale_count(&self) -> usize {
        self.sales.len()
    }

    /// The JSON document for a dataset.
    pub fn to_json(&self, kind: DatasetKind) -> String {
        if let Some(document) = self.overrides.get(&kind) {
            return document.clone();
        }
        let records = match kind {
            DatasetKind::Categories => &self.categories,
            DatasetKind::Products => &self.products,
            DatasetKind::Contacts => &self.contacts,
            DatasetKind::Sales => &self.sales,
        };
        Value::Array(records.clone()).to_string()
    }

    /// In-memory sources serving every document.
    pub fn into_sources(self) -> InMemorySources {
        DatasetKind::LOAD_ORDER
            .into_iter()
            .fold(InMemorySources::new(), |sources, kind| {
                sources.with_document(kind, self.to_json(kind))
            })
    }

    /// Write the documents under `dir` with the default file names and
    /// return a config pointing there.
    pub fn write_to(&self, dir: &Path) -> io::Result<SalesdexConfig> {
        let config = SalesdexConfig {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        };
        for (kind, path) in config.dataset_paths() {
            fs::write(path, self.to_json(kind))?;
        }
        Ok(config)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! A small reference dataset with hand-checked answers.
    //!
    //! Year 2024 quantities:
    //!
    //! | sale | product       | client | country | qty |
    //! |------|---------------|--------|---------|-----|
    //! | 1    | 10 Laptop     | 100    | Belgium | 3   |
    //! | 2    | 11 Phone      | 101    | Belgium | 5   |
    //! | 3    | 10 Laptop     | 102    | France  | 2   |
    //! | 4    | 12 Tablet     | 100    | Belgium | 1   |
    //! | 5    | 20 Desk       | 102    | France  | 4   |
    //! | 6    | 21 Chair      | 103    | Unknown | 4   |
    //!
    //! Sale 7 is from 2023 and sale 8 has zero quantity; both are dropped.
    //! Laptop and Phone tie at 5 in Electronics, Desk and Chair tie at 4 in
    //! Furniture. Category 6 repeats the name "Electronics" with no sales.

    use super::*;

    pub const ALL: i64 = 1;
    pub const ELECTRONICS: i64 = 2;
    pub const FURNITURE: i64 = 3;
    pub const ACCESSORIES: i64 = 5;
    pub const ELECTRONICS_DUPLICATE: i64 = 6;

    pub const LAPTOP: i64 = 10;
    pub const PHONE: i64 = 11;
    pub const TABLET: i64 = 12;
    pub const DESK: i64 = 20;
    pub const CHAIR: i64 = 21;
    pub const CABLE: i64 = 30;

    pub const AZURE: i64 = 100;
    pub const DECO: i64 = 101;
    pub const GEMINI: i64 = 102;
    pub const LUMBER: i64 = 103;

    pub const BELGIUM_CODE: i64 = 21;
    pub const FRANCE_CODE: i64 = 75;

    pub fn electronics_fixture() -> DatasetFixture {
        DatasetFixture::new()
            .category(ALL, "All")
            .child_category(ELECTRONICS, "Electronics", ALL, "All")
            .child_category(FURNITURE, "Furniture", ALL, "All")
            .child_category(ACCESSORIES, "Accessories", ELECTRONICS, "Electronics")
            .child_category(ELECTRONICS_DUPLICATE, "Electronics", ALL, "All")
            .product(LAPTOP, ELECTRONICS, "Laptop", 1000.0)
            .product(PHONE, ELECTRONICS, "Phone", 500.0)
            .product(TABLET, ELECTRONICS, "Tablet", 300.0)
            .product(DESK, FURNITURE, "Desk", 200.0)
            .product(CHAIR, FURNITURE, "Chair", 80.0)
            .product(CABLE, ACCESSORIES, "Cable", 5.0)
            .contact(AZURE, "Azure Interior", Some((BELGIUM_CODE, "Belgium")))
            .contact(DECO, "Deco Addict", Some((BELGIUM_CODE, "Belgium")))
            .contact(GEMINI, "Gemini Furniture", Some((FRANCE_CODE, "France")))
            .contact(LUMBER, "Lumber Inc", None)
            .sale(1, LAPTOP, AZURE, 3.0)
            .sale(2, PHONE, DECO, 5.0)
            .sale(3, LAPTOP, GEMINI, 2.0)
            .sale(4, TABLET, AZURE, 1.0)
            .sale(5, DESK, GEMINI, 4.0)
            .sale(6, CHAIR, LUMBER, 4.0)
            .sale_on(7, CABLE, DECO, 10.0, "2023-11-02 08:00:00")
            .sale(8, TABLET, DECO, 0.0)
    }

    /// In-memory sources for [`electronics_fixture`].
    pub fn electronics_sources() -> InMemorySources {
        electronics_fixture().into_sources()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for sales data and query keys.

    use super::*;
    use proptest::prelude::*;

    /// One sale line: (product index, client index, quantity).
    pub type SaleLine = (usize, usize, f64);

    /// Positive quantities in tenths, from 0.1 to 49.9.
    pub fn arb_quantity() -> impl Strategy<Value = f64> {
        (1u32..500).prop_map(|tenths| f64::from(tenths) / 10.0)
    }

    /// Sale lines over `products` products and `clients` clients.
    pub fn arb_sale_lines(
        products: usize,
        clients: usize,
        max_lines: usize,
    ) -> impl Strategy<Value = Vec<SaleLine>> {
        prop::collection::vec((0..products, 0..clients, arb_quantity()), 1..max_lines)
    }

    /// Category keys as they arrive from a query string.
    pub fn arb_category_key() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<i64>().prop_map(|id| id.to_string()),
            "[A-Za-z][A-Za-z ]{0,15}",
        ]
    }

    /// A fixture with one category, `products` products and `clients`
    /// clients spread over two countries, plus the given sale lines.
    pub fn fixture_from_lines(products: usize, clients: usize, lines: &[SaleLine]) -> DatasetFixture {
        let mut fixture = DatasetFixture::new().category(1, "Everything");
        for product in 0..products {
            fixture = fixture.product(product as i64 + 1, 1, &format!("product {product}"), 1.0);
        }
        for client in 0..clients {
            let country = if client % 2 == 0 { (1, "North") } else { (2, "South") };
            fixture = fixture.contact(client as i64 + 1, &format!("client {client}"), Some(country));
        }
        for (line, (product, client, quantity)) in lines.iter().enumerate() {
            fixture = fixture.sale(
                line as i64 + 1,
                *product as i64 + 1,
                *client as i64 + 1,
                *quantity,
            );
        }
        fixture
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for salesdex error kinds.

    use super::*;

    /// Assert that a result is a `DatasetMalformed` error for `dataset`.
    #[track_caller]
    pub fn assert_malformed<T: std::fmt::Debug>(result: &SalesdexResult<T>, dataset: DatasetKind) {
        match result {
            Err(SalesdexError::Load(LoadError::DatasetMalformed { dataset: d, .. })) => {
                assert_eq!(*d, dataset, "Wrong dataset in malformed error");
            }
            other => panic!("Expected DatasetMalformed for {}, got: {:?}", dataset, other),
        }
    }

    /// Assert that a result is an `EmptyResult` query error.
    #[track_caller]
    pub fn assert_empty_result<T: std::fmt::Debug>(result: &SalesdexResult<T>) {
        match result {
            Err(SalesdexError::Query(QueryError::EmptyResult { .. })) => {}
            other => panic!("Expected EmptyResult, got: {:?}", other),
        }
    }

    /// Assert that a result is an `InvalidParameter` error for `name`.
    #[track_caller]
    pub fn assert_invalid_parameter<T: std::fmt::Debug>(result: &SalesdexResult<T>, name: &str) {
        match result {
            Err(SalesdexError::Query(QueryError::InvalidParameter { name: n, .. })) => {
                assert_eq!(n, name, "Wrong parameter in InvalidParameter error");
            }
            other => panic!("Expected InvalidParameter for {}, got: {:?}", name, other),
        }
    }

    /// Assert that a result is a `NotLoaded` store error.
    #[track_caller]
    pub fn assert_not_loaded<T: std::fmt::Debug>(result: &SalesdexResult<T>) {
        match result {
            Err(SalesdexError::Store(StoreError::NotLoaded)) => {}
            other => panic!("Expected NotLoaded, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use salesdex_storage::DatasetSource;
    use std::io::Read;

    #[test]
    fn test_fixture_documents_are_json_arrays() {
        let fixture = fixtures::electronics_fixture();
        for kind in DatasetKind::LOAD_ORDER {
            let parsed: Value = serde_json::from_str(&fixture.to_json(kind)).unwrap();
            assert!(parsed.is_array(), "{} is not an array", kind);
        }
        assert_eq!(fixture.sale_count(), 8);
    }

    #[test]
    fn test_document_override() {
        let fixture = DatasetFixture::new().document(DatasetKind::Sales, "not json");
        assert_eq!(fixture.to_json(DatasetKind::Sales), "not json");
        assert_eq!(fixture.to_json(DatasetKind::Products), "[]");
    }

    #[test]
    fn test_into_sources_serves_documents() {
        let sources = DatasetFixture::new().category(1, "All").into_sources();
        let mut body = String::new();
        sources
            .open(DatasetKind::Categories)
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert!(body.contains("\"All\""));
    }

    #[test]
    fn test_assertions() {
        let result: SalesdexResult<()> = Err(StoreError::NotLoaded.into());
        assertions::assert_not_loaded(&result);

        let result: SalesdexResult<()> = Err(QueryError::InvalidParameter {
            name: "limit".to_string(),
            value: "0".to_string(),
            reason: "too small".to_string(),
        }
        .into());
        assertions::assert_invalid_parameter(&result, "limit");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_fixture_from_lines_keeps_every_line(
            lines in generators::arb_sale_lines(4, 3, 20)
        ) {
            let fixture = generators::fixture_from_lines(4, 3, &lines);
            prop_assert_eq!(fixture.sale_count(), lines.len());
        }
    }
}
