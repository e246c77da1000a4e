//! Cached query service.
//!
//! [`SalesAnalytics`] is what the HTTP layer talks to. Each query loads the
//! store on first use, derives its cache key from the operation and the
//! normalized parameters, and runs the engine inside the result cache.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use salesdex_core::{
    CategoryLeader, CategorySelector, ClientTotal, CountryLeader, Limit, ProductTotal,
    QueryError, SalesdexConfig, SalesdexError, SalesdexResult, StoreError, UniqueProductsLeader,
};
use salesdex_storage::{
    CacheConfig, CacheKey, CacheRead, CacheStats, DataStore, Indices, LoadStats, LoadSummary,
    ResultCache,
};

use crate::operation::Operation;
use crate::{clients, first, overview, products};

/// Any query result, as stored in the result cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    CategoryLeaders(Vec<CategoryLeader>),
    CountryLeaders(Vec<CountryLeader>),
    UniqueProducts(UniqueProductsLeader),
    Products(Vec<ProductTotal>),
    Clients(Vec<ClientTotal>),
}

/// The subject of a keyed query, parsed once.
#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryKey {
    Category(CategorySelector),
    Country(String),
}

/// A validated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    operation: Operation,
    key: Option<QueryKey>,
    limit: Limit,
}

impl QueryRequest {
    /// A query without key or limit.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            key: None,
            limit: Limit::default(),
        }
    }

    /// A category query with an already-typed selector. Names are trimmed.
    pub fn for_category(
        operation: Operation,
        category: &CategorySelector,
        limit: Limit,
    ) -> SalesdexResult<Self> {
        expect_key(operation, "category")?;
        let category = match category {
            CategorySelector::Id(id) => CategorySelector::Id(*id),
            CategorySelector::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(QueryError::InvalidParameter {
                        name: "category".to_string(),
                        value: name.to_string(),
                        reason: "category must not be empty".to_string(),
                    }
                    .into());
                }
                CategorySelector::Name(name.to_string())
            }
        };
        Ok(Self {
            operation,
            key: Some(QueryKey::Category(category)),
            limit,
        })
    }

    /// A country query. The name is trimmed and must not be empty.
    pub fn for_country(operation: Operation, country: &str, limit: Limit) -> SalesdexResult<Self> {
        expect_key(operation, "country")?;
        let country = country.trim();
        if country.is_empty() {
            return Err(QueryError::InvalidParameter {
                name: "country".to_string(),
                value: country.to_string(),
                reason: "country must not be empty".to_string(),
            }
            .into());
        }
        Ok(Self {
            operation,
            key: Some(QueryKey::Country(country.to_string())),
            limit,
        })
    }

    /// A keyed query from its textual key, as found in a request path.
    ///
    /// Category keys made only of digits select by id, anything else by name.
    pub fn keyed(operation: Operation, key: &str, limit: Limit) -> SalesdexResult<Self> {
        match operation.key_name() {
            None => Ok(Self::new(operation)),
            Some("category") => {
                let category: CategorySelector = key.parse()?;
                Self::for_category(operation, &category, limit)
            }
            Some(_) => Self::for_country(operation, key, limit),
        }
    }

    /// Build from a path key and the raw query string of a request.
    ///
    /// Only `limit` is read from the query string; other parameters are
    /// ignored and so do not split the cache.
    pub fn from_query(
        operation: Operation,
        key: Option<&str>,
        raw_query: &str,
    ) -> SalesdexResult<Self> {
        let params = CacheKey::from_query(operation.as_str(), raw_query);
        let limit = Limit::parse_optional(params.param("limit"))?;
        match (operation.key_name(), key) {
            (None, _) => Ok(Self::new(operation)),
            (Some(_), Some(key)) => Self::keyed(operation, key, limit),
            (Some(name), None) => Err(missing_key(name)),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn category(&self) -> Option<&CategorySelector> {
        match &self.key {
            Some(QueryKey::Category(category)) => Some(category),
            _ => None,
        }
    }

    pub fn country(&self) -> Option<&str> {
        match &self.key {
            Some(QueryKey::Country(country)) => Some(country),
            _ => None,
        }
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    /// Cache key: operation, key parameter, and limit unless it is the default.
    ///
    /// Category ids and names go under different parameters, so the id 2024
    /// and a category named "2024" never share an entry.
    pub fn cache_key(&self) -> CacheKey {
        let mut cache_key = CacheKey::new(self.operation.as_str());
        cache_key = match &self.key {
            Some(QueryKey::Category(CategorySelector::Id(id))) => {
                cache_key.with_param("category_id", id.to_string())
            }
            Some(QueryKey::Category(CategorySelector::Name(name))) => {
                cache_key.with_param("category_name", name)
            }
            Some(QueryKey::Country(country)) => cache_key.with_param("country", country),
            None => cache_key,
        };
        if self.operation.is_ranked() && !self.limit.is_default() {
            cache_key = cache_key.with_param("limit", self.limit.get().to_string());
        }
        cache_key
    }

    /// Run against a loaded snapshot, bypassing the cache.
    pub fn execute(&self, indices: &Indices) -> SalesdexResult<QueryOutput> {
        Ok(match self.operation {
            Operation::MostSoldByCategory => {
                QueryOutput::CategoryLeaders(overview::most_sold_by_category(indices)?)
            }
            Operation::MostSoldByCountry => {
                QueryOutput::CountryLeaders(overview::most_sold_by_country(indices)?)
            }
            Operation::TopClient => {
                QueryOutput::UniqueProducts(clients::top_client_by_unique_products(indices)?)
            }
            Operation::TopProductsByCategory => QueryOutput::Products(
                products::top_products_by_category(indices, self.category_key()?, self.limit)?,
            ),
            Operation::TopProductsByCountry => QueryOutput::Products(
                products::top_products_by_country(indices, self.country_key()?, self.limit)?,
            ),
            Operation::TopClientsByCategory => QueryOutput::Clients(
                clients::top_clients_by_category(indices, self.category_key()?, self.limit)?,
            ),
        })
    }

    fn category_key(&self) -> SalesdexResult<&CategorySelector> {
        self.category().ok_or_else(|| missing_key("category"))
    }

    fn country_key(&self) -> SalesdexResult<&str> {
        self.country().ok_or_else(|| missing_key("country"))
    }
}

fn expect_key(operation: Operation, name: &str) -> SalesdexResult<()> {
    if operation.key_name() == Some(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidParameter {
            name: name.to_string(),
            value: operation.to_string(),
            reason: format!("{} does not take a {}", operation, name),
        }
        .into())
    }
}

fn missing_key(name: &str) -> SalesdexError {
    QueryError::InvalidParameter {
        name: name.to_string(),
        value: String::new(),
        reason: format!("{} is required", name),
    }
    .into()
}

/// Cached aggregate queries over a shared [`DataStore`].
pub struct SalesAnalytics {
    store: Arc<DataStore>,
    cache: ResultCache<QueryOutput>,
}

impl SalesAnalytics {
    pub fn new(store: Arc<DataStore>, cache: CacheConfig) -> Self {
        Self {
            store,
            cache: ResultCache::new(cache),
        }
    }

    /// Service over the configured files with the configured cache.
    pub fn from_config(config: &SalesdexConfig) -> Self {
        Self::new(
            Arc::new(DataStore::from_config(config)),
            CacheConfig::from(config),
        )
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Load the datasets now instead of on the first query.
    pub fn warm_up(&self) -> SalesdexResult<LoadSummary> {
        Ok(*self.store.ensure_loaded()?.summary())
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_loaded()
    }

    /// Run a query through the result cache.
    pub fn run(&self, request: &QueryRequest) -> SalesdexResult<CacheRead<QueryOutput>> {
        let key = request.cache_key();
        debug!(key = %key, "Running query");
        self.cache.get_or_compute(key, || {
            let indices = self.store.ensure_loaded()?;
            request.execute(&indices)
        })
    }

    pub fn most_sold_by_category(&self) -> SalesdexResult<Vec<CategoryLeader>> {
        match self.run_value(&QueryRequest::new(Operation::MostSoldByCategory))? {
            QueryOutput::CategoryLeaders(leaders) => Ok(leaders),
            _ => Err(mismatch(Operation::MostSoldByCategory)),
        }
    }

    pub fn most_sold_by_country(&self) -> SalesdexResult<Vec<CountryLeader>> {
        match self.run_value(&QueryRequest::new(Operation::MostSoldByCountry))? {
            QueryOutput::CountryLeaders(leaders) => Ok(leaders),
            _ => Err(mismatch(Operation::MostSoldByCountry)),
        }
    }

    pub fn top_client_by_unique_products(&self) -> SalesdexResult<UniqueProductsLeader> {
        match self.run_value(&QueryRequest::new(Operation::TopClient))? {
            QueryOutput::UniqueProducts(leader) => Ok(leader),
            _ => Err(mismatch(Operation::TopClient)),
        }
    }

    pub fn top_product_by_category(&self, category: &CategorySelector) -> SalesdexResult<ProductTotal> {
        let ranked = self.top_products_by_category(category, Limit::default())?;
        first(ranked, "top_product_by_category", category)
    }

    pub fn top_products_by_category(
        &self,
        category: &CategorySelector,
        limit: Limit,
    ) -> SalesdexResult<Vec<ProductTotal>> {
        let operation = Operation::TopProductsByCategory;
        let request = QueryRequest::for_category(operation, category, limit)?;
        match self.run_value(&request)? {
            QueryOutput::Products(products) => Ok(products),
            _ => Err(mismatch(operation)),
        }
    }

    pub fn top_product_by_country(&self, country: &str) -> SalesdexResult<ProductTotal> {
        let ranked = self.top_products_by_country(country, Limit::default())?;
        first(ranked, "top_product_by_country", country)
    }

    pub fn top_products_by_country(
        &self,
        country: &str,
        limit: Limit,
    ) -> SalesdexResult<Vec<ProductTotal>> {
        let operation = Operation::TopProductsByCountry;
        let request = QueryRequest::for_country(operation, country, limit)?;
        match self.run_value(&request)? {
            QueryOutput::Products(products) => Ok(products),
            _ => Err(mismatch(operation)),
        }
    }

    pub fn top_client_by_category(&self, category: &CategorySelector) -> SalesdexResult<ClientTotal> {
        let ranked = self.top_clients_by_category(category, Limit::default())?;
        first(ranked, "top_client_by_category", category)
    }

    pub fn top_clients_by_category(
        &self,
        category: &CategorySelector,
        limit: Limit,
    ) -> SalesdexResult<Vec<ClientTotal>> {
        let operation = Operation::TopClientsByCategory;
        let request = QueryRequest::for_category(operation, category, limit)?;
        match self.run_value(&request)? {
            QueryOutput::Clients(clients) => Ok(clients),
            _ => Err(mismatch(operation)),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn load_stats(&self) -> LoadStats {
        self.store.stats()
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn run_value(&self, request: &QueryRequest) -> SalesdexResult<QueryOutput> {
        self.run(request).map(CacheRead::into_value)
    }
}

fn mismatch(operation: Operation) -> SalesdexError {
    StoreError::ComputationAbandoned {
        operation: operation.to_string(),
    }
    .into()
}
