//! Configuration types

use crate::{ConfigError, DatasetKind, SalesdexError, SalesdexResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default result cache expiry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default number of ready entries kept by the result cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;

/// Only sales dated in this year are loaded unless configured otherwise.
pub const DEFAULT_SALES_YEAR: i32 = 2024;

/// File names of the four datasets, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFiles {
    pub categories: String,
    pub products: String,
    pub contacts: String,
    pub sales: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            categories: DatasetKind::Categories.default_file_name().to_string(),
            products: DatasetKind::Products.default_file_name().to_string(),
            contacts: DatasetKind::Contacts.default_file_name().to_string(),
            sales: DatasetKind::Sales.default_file_name().to_string(),
        }
    }
}

impl DatasetFiles {
    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Categories => &self.categories,
            DatasetKind::Products => &self.products,
            DatasetKind::Contacts => &self.contacts,
            DatasetKind::Sales => &self.sales,
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesdexConfig {
    /// Directory holding the dataset files.
    pub data_dir: PathBuf,
    pub files: DatasetFiles,
    /// Sales dated outside this year are skipped during load.
    pub sales_year: i32,
    /// Expiry applied to every cached aggregate.
    pub cache_ttl: Duration,
    /// Maximum number of ready entries in the result cache.
    pub cache_max_entries: usize,
}

impl Default for SalesdexConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            files: DatasetFiles::default(),
            sales_year: DEFAULT_SALES_YEAR,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl SalesdexConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `SALESDEX_DATA_DIR`: Directory with the dataset files (default: data)
    /// - `SALESDEX_CATEGORIES_FILE`: Categories file name (default: categories.json)
    /// - `SALESDEX_PRODUCTS_FILE`: Products file name (default: products.json)
    /// - `SALESDEX_CONTACTS_FILE`: Contacts file name (default: contacts.json)
    /// - `SALESDEX_SALES_FILE`: Sales file name (default: sale_order_lines.json)
    /// - `SALESDEX_SALES_YEAR`: Year of sales to load (default: 2024)
    /// - `SALESDEX_CACHE_TTL_SECS`: Cache expiry in seconds (default: 300)
    /// - `SALESDEX_CACHE_MAX_ENTRIES`: Cache capacity (default: 500)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let file = |var: &str, fallback: String| std::env::var(var).unwrap_or(fallback);

        Self {
            data_dir: std::env::var("SALESDEX_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            files: DatasetFiles {
                categories: file("SALESDEX_CATEGORIES_FILE", defaults.files.categories),
                products: file("SALESDEX_PRODUCTS_FILE", defaults.files.products),
                contacts: file("SALESDEX_CONTACTS_FILE", defaults.files.contacts),
                sales: file("SALESDEX_SALES_FILE", defaults.files.sales),
            },
            sales_year: std::env::var("SALESDEX_SALES_YEAR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sales_year),
            cache_ttl: std::env::var("SALESDEX_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_entries: std::env::var("SALESDEX_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_max_entries),
        }
    }

    /// Full path of every dataset file, in load order.
    pub fn dataset_paths(&self) -> Vec<(DatasetKind, PathBuf)> {
        DatasetKind::LOAD_ORDER
            .iter()
            .map(|kind| (*kind, self.data_dir.join(self.files.file_name(*kind))))
            .collect()
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - data_dir is not empty
    /// - every dataset file name is set
    /// - cache_ttl and cache_max_entries are positive
    pub fn validate(&self) -> SalesdexResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(SalesdexError::Config(ConfigError::MissingRequired {
                field: "data_dir".to_string(),
            }));
        }

        for kind in DatasetKind::LOAD_ORDER {
            if self.files.file_name(kind).trim().is_empty() {
                return Err(SalesdexError::Config(ConfigError::MissingRequired {
                    field: format!("files.{}", kind),
                }));
            }
        }

        if self.cache_ttl.is_zero() {
            return Err(SalesdexError::Config(ConfigError::InvalidValue {
                field: "cache_ttl".to_string(),
                value: format!("{:?}", self.cache_ttl),
                reason: "cache_ttl must be positive".to_string(),
            }));
        }

        if self.cache_max_entries == 0 {
            return Err(SalesdexError::Config(ConfigError::InvalidValue {
                field: "cache_max_entries".to_string(),
                value: self.cache_max_entries.to_string(),
                reason: "cache_max_entries must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}
