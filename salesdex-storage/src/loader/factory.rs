use salesdex_core::{DatasetKind, SalesdexResult};

use super::{
    CategoryLoader, ContactLoader, DatasetLoader, LoadSettings, ProductLoader, SalesLoader,
};

/// Maps a dataset type to its loading strategy.
///
/// This is the only place that knows the concrete strategies. Stateless
/// apart from the load settings, and cheap to call repeatedly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderFactory {
    settings: LoadSettings,
}

impl LoaderFactory {
    pub fn new(settings: LoadSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> LoadSettings {
        self.settings
    }

    /// Create the loader for a dataset type tag such as `"sales"`.
    ///
    /// Fails with `UnknownDatasetType` for anything else.
    pub fn create(&self, dataset_type: &str) -> SalesdexResult<Box<dyn DatasetLoader>> {
        let kind: DatasetKind = dataset_type.parse()?;
        Ok(self.for_kind(kind))
    }

    pub fn for_kind(&self, kind: DatasetKind) -> Box<dyn DatasetLoader> {
        match kind {
            DatasetKind::Categories => Box::new(CategoryLoader),
            DatasetKind::Products => Box::new(ProductLoader),
            DatasetKind::Contacts => Box::new(ContactLoader),
            DatasetKind::Sales => Box::new(SalesLoader::new(self.settings.sales_year)),
        }
    }
}
