//! Entity types loaded from the source datasets.
//!
//! All entities are created once during the load phase and never mutated
//! afterwards.

use crate::identity::{CategoryId, ContactId, ProductId, SaleId, Timestamp};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Country name used for contacts whose record carries no country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
    /// Display name of the parent category, if the record names one.
    pub parent_name: Option<String>,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub unit_price: f64,
}

/// Country a contact belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// Source country code; absent for the unknown country.
    pub code: Option<i64>,
}

impl Country {
    pub fn new(name: impl Into<String>, code: i64) -> Self {
        Self {
            name: name.into(),
            code: Some(code),
        }
    }

    /// The bucket for contacts without a country.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_COUNTRY.to_string(),
            code: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.code.is_none() && self.name == UNKNOWN_COUNTRY
    }
}

/// A client contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub contact_id: ContactId,
    pub name: String,
    pub country: Country,
}

/// A single sale order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub sale_id: SaleId,
    pub contact_id: ContactId,
    pub product_id: ProductId,
    /// Always strictly positive for loaded records.
    pub quantity: f64,
    pub sold_at: Timestamp,
    /// Quantity multiplied by the effective unit price.
    pub line_total: f64,
}

impl SaleRecord {
    pub fn new(
        sale_id: SaleId,
        contact_id: ContactId,
        product_id: ProductId,
        quantity: f64,
        unit_price: f64,
        sold_at: Timestamp,
    ) -> Self {
        Self {
            sale_id,
            contact_id,
            product_id,
            quantity,
            sold_at,
            line_total: quantity * unit_price,
        }
    }

    pub fn year(&self) -> i32 {
        self.sold_at.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32) -> Timestamp {
        NaiveDate::from_ymd_opt(year, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_sale_record_derives_line_total() {
        let sale = SaleRecord::new(
            SaleId::new(1),
            ContactId::new(2),
            ProductId::new(3),
            4.0,
            2.5,
            at(2024),
        );
        assert_eq!(sale.line_total, 10.0);
        assert_eq!(sale.year(), 2024);
    }

    #[test]
    fn test_unknown_country() {
        let unknown = Country::unknown();
        assert!(unknown.is_unknown());
        assert_eq!(unknown.name, UNKNOWN_COUNTRY);
        assert!(!Country::new("Belgium", 21).is_unknown());
    }
}
