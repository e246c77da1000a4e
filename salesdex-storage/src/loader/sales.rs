use std::collections::HashSet;

use chrono::Datelike;
use serde::Deserialize;
use tracing::debug;

use salesdex_core::{ContactId, DatasetKind, ProductId, SaleId, SaleRecord, SalesdexResult};

use super::reference::{parse_timestamp, RawReference};
use super::stream::for_each_record;
use super::{duplicate_id, malformed, DatasetLoader, LoadedDataset, ReferenceTables, SalesBatch};
use crate::source::DatasetReader;

#[derive(Debug, Deserialize)]
struct SaleLineRecord {
    id: i64,
    product_id: RawReference,
    order_partner_id: RawReference,
    product_uom_qty: f64,
    create_date: String,
    #[serde(default)]
    price_unit: Option<f64>,
}

/// Loads `sales` (sale order lines).
///
/// Lines from other years and lines with a non-positive quantity are dropped
/// and counted. Kept lines must resolve both their product and their client.
#[derive(Debug, Clone, Copy)]
pub struct SalesLoader {
    sales_year: i32,
}

impl SalesLoader {
    pub fn new(sales_year: i32) -> Self {
        Self { sales_year }
    }

    pub fn sales_year(&self) -> i32 {
        self.sales_year
    }
}

impl DatasetLoader for SalesLoader {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Sales
    }

    fn load(&self, reader: DatasetReader, tables: &ReferenceTables) -> SalesdexResult<LoadedDataset> {
        let mut batch = SalesBatch::default();
        let mut seen = HashSet::new();
        let kind = self.kind();

        for_each_record(reader, kind, |position, line: SaleLineRecord| {
            let sale_id = SaleId::new(line.id);
            let sold_at = parse_timestamp(&line.create_date).ok_or_else(|| {
                malformed(
                    kind,
                    position,
                    format!("sale {} has unparseable create_date {:?}", sale_id, line.create_date),
                )
            })?;

            if sold_at.year() != self.sales_year {
                batch.skipped_out_of_year += 1;
                return Ok(());
            }
            if line.product_uom_qty <= 0.0 {
                batch.skipped_non_positive += 1;
                return Ok(());
            }

            let product = line
                .product_id
                .id()
                .map(ProductId::new)
                .and_then(|id| tables.products.get(&id))
                .ok_or_else(|| {
                    malformed(kind, position, format!("sale {} references an unknown product", sale_id))
                })?;
            let contact_id = line
                .order_partner_id
                .id()
                .map(ContactId::new)
                .filter(|id| tables.contacts.contains_key(id))
                .ok_or_else(|| {
                    malformed(kind, position, format!("sale {} references an unknown client", sale_id))
                })?;
            if !seen.insert(sale_id) {
                return Err(duplicate_id(kind, position, sale_id));
            }

            let unit_price = line.price_unit.unwrap_or(product.unit_price);
            batch.records.push(SaleRecord::new(
                sale_id,
                contact_id,
                product.product_id,
                line.product_uom_qty,
                unit_price,
                sold_at,
            ));
            Ok(())
        })?;

        debug!(
            kept = batch.records.len(),
            skipped_out_of_year = batch.skipped_out_of_year,
            skipped_non_positive = batch.skipped_non_positive,
            sales_year = self.sales_year,
            "Filtered sales lines"
        );
        Ok(LoadedDataset::Sales(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdex_core::{CategoryId, Contact, Country, Product};
    use std::io::Cursor;

    fn tables() -> ReferenceTables {
        let mut tables = ReferenceTables::default();
        tables.products.insert(
            ProductId::new(10),
            Product {
                product_id: ProductId::new(10),
                category_id: CategoryId::new(1),
                name: "Desk".to_string(),
                unit_price: 100.0,
            },
        );
        tables.contacts.insert(
            ContactId::new(7),
            Contact {
                contact_id: ContactId::new(7),
                name: "Azure Interior".to_string(),
                country: Country::new("Belgium", 21),
            },
        );
        tables
    }

    fn load(json: &'static str) -> SalesdexResult<SalesBatch> {
        match SalesLoader::new(2024).load(Box::new(Cursor::new(json)), &tables())? {
            LoadedDataset::Sales(batch) => Ok(batch),
            other => panic!("unexpected dataset {:?}", other.kind()),
        }
    }

    #[test]
    fn test_keeps_sales_of_the_configured_year() {
        let batch = load(
            r#"[
                {"id": 1, "product_id": [10, "Desk"], "order_partner_id": [7, "Azure"],
                 "product_uom_qty": 2.0, "create_date": "2024-03-01 10:00:00", "price_unit": 80.0},
                {"id": 2, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 1, "create_date": "2023-12-31 23:59:59"},
                {"id": 3, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 0, "create_date": "2024-06-01"},
                {"id": 4, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 3, "create_date": "2024-06-01"}
            ]"#,
        )
        .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped_out_of_year, 1);
        assert_eq!(batch.skipped_non_positive, 1);
        assert_eq!(batch.records[0].line_total, 160.0);
        assert_eq!(batch.records[1].line_total, 300.0);
    }

    #[test]
    fn test_unresolvable_references_are_malformed() {
        let unknown_product = load(
            r#"[{"id": 1, "product_id": 99, "order_partner_id": 7,
                 "product_uom_qty": 1, "create_date": "2024-01-01"}]"#,
        )
        .unwrap_err();
        assert!(unknown_product.to_string().contains("unknown product"));

        let unset_client = load(
            r#"[{"id": 1, "product_id": 10, "order_partner_id": false,
                 "product_uom_qty": 1, "create_date": "2024-01-01"}]"#,
        )
        .unwrap_err();
        assert!(unset_client.to_string().contains("unknown client"));
    }

    #[test]
    fn test_wrong_quantity_type_is_malformed() {
        let err = load(
            r#"[{"id": 1, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": "five", "create_date": "2024-01-01"}]"#,
        )
        .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let err = load(
            r#"[{"id": 1, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 1, "create_date": "soon"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("create_date"));
    }

    #[test]
    fn test_duplicate_sale_id_is_malformed() {
        let err = load(
            r#"[{"id": 1, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 1, "create_date": "2024-01-01"},
                {"id": 1, "product_id": 10, "order_partner_id": 7,
                 "product_uom_qty": 1, "create_date": "2024-01-02"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate sale id 1"));
    }
}
