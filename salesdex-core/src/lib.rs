//! Salesdex Core - Entity Types
//!
//! Pure data structures shared by every salesdex crate: identifiers, loaded
//! entities, aggregate results, configuration, and the error taxonomy.
//! This crate performs no I/O.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod entities;
pub mod error;
pub mod identity;
pub mod quantity;

pub use aggregate::{
    CategoryLeader, CategorySelector, ClientTotal, CountryLeader, Limit, ProductTotal,
    UniqueProductsLeader, MAX_LIMIT,
};
pub use config::{
    DatasetFiles, SalesdexConfig, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL,
    DEFAULT_SALES_YEAR,
};
pub use dataset::DatasetKind;
pub use entities::{Category, Contact, Country, Product, SaleRecord, UNKNOWN_COUNTRY};
pub use error::{
    ConfigError, LoadError, QueryError, RecordPosition, SalesdexError, SalesdexResult,
    StoreError,
};
pub use identity::{CategoryId, ContactId, EntityIdType, ProductId, SaleId, Timestamp};
pub use quantity::{QuantitySum, QUANTITY_SCALE};
