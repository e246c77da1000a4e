use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate queries answered by [`crate::SalesAnalytics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Best seller of every category with sales.
    MostSoldByCategory,
    /// Best seller of every country with sales.
    MostSoldByCountry,
    /// Client with the most distinct products.
    TopClient,
    /// Ranked products of one category.
    TopProductsByCategory,
    /// Ranked products of one country.
    TopProductsByCountry,
    /// Ranked clients of one category.
    TopClientsByCategory,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::MostSoldByCategory,
        Operation::MostSoldByCountry,
        Operation::TopClient,
        Operation::TopProductsByCategory,
        Operation::TopProductsByCountry,
        Operation::TopClientsByCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::MostSoldByCategory => "most_sold_by_category",
            Operation::MostSoldByCountry => "most_sold_by_country",
            Operation::TopClient => "top_client",
            Operation::TopProductsByCategory => "top_products_by_category",
            Operation::TopProductsByCountry => "top_products_by_country",
            Operation::TopClientsByCategory => "top_clients_by_category",
        }
    }

    /// Name of the key parameter, for operations that take one.
    pub fn key_name(&self) -> Option<&'static str> {
        match self {
            Operation::TopProductsByCategory | Operation::TopClientsByCategory => Some("category"),
            Operation::TopProductsByCountry => Some("country"),
            Operation::MostSoldByCategory | Operation::MostSoldByCountry | Operation::TopClient => {
                None
            }
        }
    }

    /// Whether the operation honours a top-N limit.
    pub fn is_ranked(&self) -> bool {
        self.key_name().is_some()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
