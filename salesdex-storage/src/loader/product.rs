use std::collections::BTreeMap;

use serde::Deserialize;

use salesdex_core::{CategoryId, DatasetKind, Product, ProductId, SalesdexResult};

use super::reference::RawReference;
use super::stream::for_each_record;
use super::{insert_unique, malformed, DatasetLoader, LoadedDataset, ReferenceTables};
use crate::source::DatasetReader;

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: i64,
    name: String,
    categ_id: RawReference,
    #[serde(default)]
    list_price: Option<f64>,
}

/// Loads `products`. Every product must name a loaded category.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductLoader;

impl DatasetLoader for ProductLoader {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Products
    }

    fn load(&self, reader: DatasetReader, tables: &ReferenceTables) -> SalesdexResult<LoadedDataset> {
        let mut products = BTreeMap::new();

        for_each_record(reader, self.kind(), |position, record: ProductRecord| {
            let product_id = ProductId::new(record.id);
            let category_id = record
                .categ_id
                .id()
                .map(CategoryId::new)
                .ok_or_else(|| {
                    malformed(self.kind(), position, format!("product {} has no category", product_id))
                })?;
            if !tables.categories.contains_key(&category_id) {
                return Err(malformed(
                    self.kind(),
                    position,
                    format!("product {} references unknown category {}", product_id, category_id),
                ));
            }
            let product = Product {
                product_id,
                category_id,
                name: record.name,
                unit_price: record.list_price.unwrap_or(0.0),
            };
            insert_unique(&mut products, product_id, product, self.kind(), position)
        })?;

        Ok(LoadedDataset::Products(products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdex_core::Category;
    use std::io::Cursor;

    fn tables() -> ReferenceTables {
        let mut tables = ReferenceTables::default();
        tables.categories.insert(
            CategoryId::new(1),
            Category {
                category_id: CategoryId::new(1),
                name: "Desks".to_string(),
                parent_name: None,
            },
        );
        tables
    }

    fn load(json: &'static str) -> SalesdexResult<BTreeMap<ProductId, Product>> {
        match ProductLoader.load(Box::new(Cursor::new(json)), &tables())? {
            LoadedDataset::Products(products) => Ok(products),
            other => panic!("unexpected dataset {:?}", other.kind()),
        }
    }

    #[test]
    fn test_loads_products() {
        let products = load(
            r#"[
                {"id": 10, "name": "Standing desk", "categ_id": [1, "Desks"], "list_price": 450.0},
                {"id": 11, "name": "Corner desk", "categ_id": 1}
            ]"#,
        )
        .unwrap();
        assert_eq!(products[&ProductId::new(10)].unit_price, 450.0);
        assert_eq!(products[&ProductId::new(11)].unit_price, 0.0);
        assert_eq!(products[&ProductId::new(11)].category_id, CategoryId::new(1));
    }

    #[test]
    fn test_unknown_category_is_malformed() {
        let err = load(r#"[{"id": 10, "name": "Desk", "categ_id": [9, "Ghost"]}]"#).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("unknown category 9"));
    }

    #[test]
    fn test_unset_or_missing_category_is_malformed() {
        assert!(load(r#"[{"id": 10, "name": "Desk", "categ_id": false}]"#)
            .unwrap_err()
            .is_malformed());
        assert!(load(r#"[{"id": 10, "name": "Desk"}]"#).unwrap_err().is_malformed());
    }
}
