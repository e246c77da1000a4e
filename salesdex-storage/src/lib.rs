//! Salesdex Storage - Loading, Indexing and Caching
//!
//! Streams the four JSON datasets through per-dataset loader strategies,
//! publishes them once as an immutable [`Indices`] snapshot behind the
//! [`DataStore`], and caches aggregate results in a [`ResultCache`].

pub mod cache;
mod flight;
pub mod loader;
pub mod source;
pub mod store;

pub use cache::{CacheConfig, CacheKey, CacheRead, CacheStats, ReadOrigin, ResultCache};
pub use loader::{
    CategoryLoader, ContactLoader, ContactTable, DatasetLoader, LoadSettings, LoadedDataset,
    LoaderFactory, ProductLoader, ReferenceTables, SalesBatch, SalesLoader,
};
pub use source::{DatasetReader, DatasetSource, FileSources, InMemorySources};
pub use store::{DataStore, Indices, LoadStats, LoadSummary};
