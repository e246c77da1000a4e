//! Dataset kinds known to the loader.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four dataset shapes salesdex understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Categories,
    Products,
    Contacts,
    Sales,
}

impl DatasetKind {
    /// Dependency order: every dataset appears after the datasets it references.
    pub const LOAD_ORDER: [DatasetKind; 4] = [
        DatasetKind::Categories,
        DatasetKind::Products,
        DatasetKind::Contacts,
        DatasetKind::Sales,
    ];

    /// Type tag used in configuration and by the loader factory.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Categories => "categories",
            DatasetKind::Products => "products",
            DatasetKind::Contacts => "contacts",
            DatasetKind::Sales => "sales",
        }
    }

    /// Datasets whose records must already be loaded before this one.
    pub fn dependencies(&self) -> &'static [DatasetKind] {
        match self {
            DatasetKind::Categories | DatasetKind::Contacts => &[],
            DatasetKind::Products => &[DatasetKind::Categories],
            DatasetKind::Sales => &[DatasetKind::Products, DatasetKind::Contacts],
        }
    }

    /// Default file name inside the data directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            DatasetKind::Categories => "categories.json",
            DatasetKind::Products => "products.json",
            DatasetKind::Contacts => "contacts.json",
            DatasetKind::Sales => "sale_order_lines.json",
        }
    }

    /// Position in [`Self::LOAD_ORDER`], handy for per-kind counters.
    pub fn index(&self) -> usize {
        match self {
            DatasetKind::Categories => 0,
            DatasetKind::Products => 1,
            DatasetKind::Contacts => 2,
            DatasetKind::Sales => 3,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "categories" => Ok(DatasetKind::Categories),
            "products" => Ok(DatasetKind::Products),
            "contacts" => Ok(DatasetKind::Contacts),
            "sales" => Ok(DatasetKind::Sales),
            _ => Err(LoadError::UnknownDatasetType {
                name: s.to_string(),
            }),
        }
    }
}
