//! Dataset loader strategies.
//!
//! Each strategy stream-decodes one dataset and returns the typed collection.
//! Strategies never touch shared state: they read the reference tables built
//! by earlier stages and hand back a [`LoadedDataset`] for the store to merge.

mod category;
mod contact;
mod factory;
mod product;
mod reference;
mod sales;
mod stream;

pub use category::CategoryLoader;
pub use contact::ContactLoader;
pub use factory::LoaderFactory;
pub use product::ProductLoader;
pub use sales::SalesLoader;

use std::collections::BTreeMap;

use salesdex_core::{
    Category, CategoryId, Contact, ContactId, DatasetKind, EntityIdType, LoadError, Product,
    ProductId,
    RecordPosition, SaleRecord, SalesdexConfig, SalesdexError, SalesdexResult,
    DEFAULT_SALES_YEAR,
};

use crate::source::DatasetReader;

/// Settings that change what a loader keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSettings {
    /// Only sales from this calendar year are kept.
    pub sales_year: i32,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            sales_year: DEFAULT_SALES_YEAR,
        }
    }
}

impl From<&SalesdexConfig> for LoadSettings {
    fn from(config: &SalesdexConfig) -> Self {
        Self {
            sales_year: config.sales_year,
        }
    }
}

/// Reference tables built by the stages loaded so far.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub categories: BTreeMap<CategoryId, Category>,
    pub products: BTreeMap<ProductId, Product>,
    pub contacts: BTreeMap<ContactId, Contact>,
    /// Country name to source country code.
    pub country_codes: BTreeMap<String, i64>,
}

/// Contacts plus the country codes seen while loading them.
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    pub contacts: BTreeMap<ContactId, Contact>,
    pub country_codes: BTreeMap<String, i64>,
}

/// Sales kept by the loader plus counts of what the filters dropped.
#[derive(Debug, Clone, Default)]
pub struct SalesBatch {
    pub records: Vec<SaleRecord>,
    pub skipped_out_of_year: usize,
    pub skipped_non_positive: usize,
}

/// Output of one loader run.
#[derive(Debug, Clone)]
pub enum LoadedDataset {
    Categories(BTreeMap<CategoryId, Category>),
    Products(BTreeMap<ProductId, Product>),
    Contacts(ContactTable),
    Sales(SalesBatch),
}

impl LoadedDataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            LoadedDataset::Categories(_) => DatasetKind::Categories,
            LoadedDataset::Products(_) => DatasetKind::Products,
            LoadedDataset::Contacts(_) => DatasetKind::Contacts,
            LoadedDataset::Sales(_) => DatasetKind::Sales,
        }
    }

    /// Number of records kept.
    pub fn len(&self) -> usize {
        match self {
            LoadedDataset::Categories(categories) => categories.len(),
            LoadedDataset::Products(products) => products.len(),
            LoadedDataset::Contacts(table) => table.contacts.len(),
            LoadedDataset::Sales(batch) => batch.records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loading strategy for one dataset shape.
pub trait DatasetLoader: Send + Sync {
    /// The dataset this strategy decodes.
    fn kind(&self) -> DatasetKind;

    /// Decode the whole dataset from `reader`.
    ///
    /// Fails with `DatasetMalformed` on the first bad record; no partial
    /// collection is ever returned.
    fn load(&self, reader: DatasetReader, tables: &ReferenceTables)
        -> SalesdexResult<LoadedDataset>;
}

pub(crate) fn malformed(
    dataset: DatasetKind,
    position: RecordPosition,
    reason: impl Into<String>,
) -> SalesdexError {
    LoadError::DatasetMalformed {
        dataset,
        position,
        reason: reason.into(),
    }
    .into()
}

/// A second record with an id already seen, named after the entity.
pub(crate) fn duplicate_id<K: EntityIdType>(
    dataset: DatasetKind,
    position: RecordPosition,
    id: K,
) -> SalesdexError {
    malformed(
        dataset,
        position,
        format!("duplicate {} id {}", K::ENTITY_NAME, id),
    )
}

/// Insert a record keyed by id, rejecting duplicates.
pub(crate) fn insert_unique<K: EntityIdType, V>(
    map: &mut BTreeMap<K, V>,
    id: K,
    value: V,
    dataset: DatasetKind,
    position: RecordPosition,
) -> SalesdexResult<()> {
    if map.contains_key(&id) {
        return Err(duplicate_id(dataset, position, id));
    }
    map.insert(id, value);
    Ok(())
}
