//! Identity types for salesdex entities
//!
//! Source datasets key every record by an integer id. Each entity gets its own
//! newtype so a product id can never be passed where a contact id is expected.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type for sale dates (source data carries no timezone).
pub type Timestamp = NaiveDateTime;

/// Common behaviour shared by all integer-backed entity identifiers.
pub trait EntityIdType: Copy + Ord + fmt::Display {
    /// Entity name used in error messages.
    const ENTITY_NAME: &'static str;
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw integer id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw integer id.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a product category.
    CategoryId,
    "category"
);
define_entity_id!(
    /// Identifier of a product.
    ProductId,
    "product"
);
define_entity_id!(
    /// Identifier of a contact (client).
    ContactId,
    "contact"
);
define_entity_id!(
    /// Identifier of a sale order line.
    SaleId,
    "sale"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_raw_value() {
        assert!(ProductId::new(1) < ProductId::new(2));
        assert_eq!(ContactId::from(7).get(), 7);
        assert_eq!(i64::from(SaleId::new(3)), 3);
    }

    #[test]
    fn test_id_parse_trims_whitespace() {
        let id: CategoryId = " 42 ".parse().unwrap();
        assert_eq!(id, CategoryId::new(42));
        assert!("electronics".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&SaleId::new(9)).unwrap();
        assert_eq!(json, "9");
        assert_eq!(ProductId::ENTITY_NAME, "product");
    }
}
