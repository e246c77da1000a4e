//! Aggregate result types and query parameters.
//!
//! These are computed views over the loaded data. They own clones of the
//! entities they mention so they can outlive a borrow of the store and sit in
//! the result cache.

use crate::{Category, CategoryId, Contact, Product, QueryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted top-N limit.
pub const MAX_LIMIT: usize = 100;

/// A product with the total quantity sold under some grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    pub product: Product,
    pub total_quantity: f64,
}

/// A client with the total quantity bought under some grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTotal {
    pub contact: Contact,
    pub total_quantity: f64,
}

/// Best seller of one category, with the category's overall volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLeader {
    pub category: Category,
    pub top_product: ProductTotal,
    pub category_total: f64,
}

/// Best seller of one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryLeader {
    pub country: String,
    pub country_code: Option<i64>,
    pub top_product: ProductTotal,
}

/// Client that bought the widest range of distinct products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueProductsLeader {
    pub contact: Contact,
    pub unique_products: usize,
}

/// How a query names a category: by id or by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategorySelector {
    Id(CategoryId),
    Name(String),
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::Id(id) => write!(f, "{}", id),
            CategorySelector::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for CategorySelector {
    type Err = QueryError;

    /// Numeric keys select by id, anything else by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.is_empty() {
            return Err(QueryError::InvalidParameter {
                name: "category".to_string(),
                value: s.to_string(),
                reason: "category must not be empty".to_string(),
            });
        }
        Ok(match key.parse::<CategoryId>() {
            Ok(id) => CategorySelector::Id(id),
            Err(_) => CategorySelector::Name(key.to_string()),
        })
    }
}

impl From<CategoryId> for CategorySelector {
    fn from(id: CategoryId) -> Self {
        CategorySelector::Id(id)
    }
}

impl From<&str> for CategorySelector {
    fn from(name: &str) -> Self {
        CategorySelector::Name(name.to_string())
    }
}

/// Number of ranked entries a top-N query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit(usize);

impl Limit {
    /// Validate a requested limit against `1..=MAX_LIMIT`.
    pub fn new(limit: usize) -> Result<Self, QueryError> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(QueryError::InvalidParameter {
                name: "limit".to_string(),
                value: limit.to_string(),
                reason: format!("limit must be between 1 and {}", MAX_LIMIT),
            });
        }
        Ok(Self(limit))
    }

    /// Parse an optional raw query value, falling back to the default.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, QueryError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::default()),
            Some(value) => {
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| QueryError::InvalidParameter {
                        name: "limit".to_string(),
                        value: value.to_string(),
                        reason: "limit must be a positive integer".to_string(),
                    })?;
                Self::new(parsed)
            }
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_numeric_keys_select_by_id(raw in any::<i64>()) {
            let selector: CategorySelector = raw.to_string().parse().unwrap();
            prop_assert_eq!(selector, CategorySelector::Id(CategoryId::new(raw)));
        }

        #[test]
        fn prop_limit_accepts_exactly_the_valid_range(limit in 0usize..200) {
            prop_assert_eq!(Limit::new(limit).is_ok(), (1..=MAX_LIMIT).contains(&limit));
        }
    }

    #[test]
    fn test_selector_parses_ids_and_names() {
        assert_eq!(
            "12".parse::<CategorySelector>().unwrap(),
            CategorySelector::Id(CategoryId::new(12))
        );
        assert_eq!(
            " Electronics ".parse::<CategorySelector>().unwrap(),
            CategorySelector::Name("Electronics".to_string())
        );
        assert!("   ".parse::<CategorySelector>().is_err());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(Limit::new(0).is_err());
        assert!(Limit::new(MAX_LIMIT + 1).is_err());
        assert_eq!(Limit::new(MAX_LIMIT).unwrap().get(), MAX_LIMIT);
    }

    #[test]
    fn test_limit_parse_optional() {
        assert!(Limit::parse_optional(None).unwrap().is_default());
        assert!(Limit::parse_optional(Some("")).unwrap().is_default());
        assert_eq!(Limit::parse_optional(Some("5")).unwrap().get(), 5);
        assert!(matches!(
            Limit::parse_optional(Some("five")),
            Err(QueryError::InvalidParameter { .. })
        ));
    }
}
