//! Load-once data store.
//!
//! The first caller of [`DataStore::ensure_loaded`] runs the four loader
//! stages; concurrent callers park on the same flight and receive its
//! outcome. A failed load leaves the store unloaded so a later call retries
//! the whole sequence. A successful load publishes an immutable [`Indices`]
//! snapshot that any number of threads may read without locking.

mod indices;

pub use indices::{Indices, LoadSummary};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use salesdex_core::{
    DatasetKind, SalesdexConfig, SalesdexError, SalesdexResult, StoreError,
};

use crate::flight::Flight;
use crate::loader::{LoadSettings, LoadedDataset, LoaderFactory, ReferenceTables, SalesBatch};
use crate::source::{DatasetSource, FileSources};

type LoadOutcome = SalesdexResult<Arc<Indices>>;

enum StoreState {
    Unloaded,
    Loading(Arc<Flight<LoadOutcome>>),
    Loaded(Arc<Indices>),
}

/// Snapshot of the store's load counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadStats {
    /// Load sequences started.
    pub attempts: u64,
    /// Load sequences that failed.
    pub failures: u64,
    /// Callers that waited on a load started by someone else.
    pub coalesced: u64,
    /// Loader invocations per dataset, in load order.
    pub invocations: [u64; 4],
}

impl LoadStats {
    pub fn invocations(&self, kind: DatasetKind) -> u64 {
        self.invocations[kind.index()]
    }
}

/// Shared, load-once facade over the four datasets.
pub struct DataStore {
    sources: Arc<dyn DatasetSource>,
    factory: LoaderFactory,
    state: Mutex<StoreState>,
    attempts: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
    invocations: [AtomicU64; 4],
}

impl DataStore {
    pub fn new(sources: Arc<dyn DatasetSource>, settings: LoadSettings) -> Self {
        Self {
            sources,
            factory: LoaderFactory::new(settings),
            state: Mutex::new(StoreState::Unloaded),
            attempts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            invocations: Default::default(),
        }
    }

    /// Store reading the configured files from disk.
    pub fn from_config(config: &SalesdexConfig) -> Self {
        Self::new(
            Arc::new(FileSources::from_config(config)),
            LoadSettings::from(config),
        )
    }

    /// Load every dataset unless a previous call already succeeded.
    ///
    /// Runs the load at most once at a time. Callers arriving while a load is
    /// in flight block until it finishes and get the same result, error
    /// included.
    pub fn ensure_loaded(&self) -> SalesdexResult<Arc<Indices>> {
        let flight = {
            let mut state = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
            let in_flight = match &*state {
                StoreState::Loaded(indices) => return Ok(Arc::clone(indices)),
                StoreState::Loading(flight) => Some(Arc::clone(flight)),
                StoreState::Unloaded => None,
            };
            match in_flight {
                Some(flight) => {
                    drop(state);
                    self.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!("Waiting for in-flight data load");
                    return flight.wait().map_err(SalesdexError::from).and_then(|outcome| outcome);
                }
                None => {
                    let flight = Flight::new();
                    *state = StoreState::Loading(Arc::clone(&flight));
                    flight
                }
            }
        };

        let caught = panic::catch_unwind(AssertUnwindSafe(|| self.load_all()));
        let (outcome, panic_payload) = match caught {
            Ok(outcome) => (outcome, None),
            Err(payload) => (
                Err(StoreError::ComputationAbandoned {
                    operation: "load".to_string(),
                }
                .into()),
                Some(payload),
            ),
        };

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = match &outcome {
                Ok(indices) => StoreState::Loaded(Arc::clone(indices)),
                Err(_) => StoreState::Unloaded,
            };
        }
        if let Err(err) = &outcome {
            self.failures.fetch_add(1, Ordering::Relaxed);
            error!(error = %err, "Data load failed");
        }
        flight.land(outcome.clone());

        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }
        outcome
    }

    /// The loaded indices. Fails with `NotLoaded` before the first successful load.
    pub fn indices(&self) -> SalesdexResult<Arc<Indices>> {
        let state = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
        match &*state {
            StoreState::Loaded(indices) => Ok(Arc::clone(indices)),
            StoreState::Unloaded | StoreState::Loading(_) => Err(StoreError::NotLoaded.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.indices().is_ok()
    }

    pub fn stats(&self) -> LoadStats {
        let mut invocations = [0; 4];
        for (slot, counter) in invocations.iter_mut().zip(&self.invocations) {
            *slot = counter.load(Ordering::Relaxed);
        }
        LoadStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            invocations,
        }
    }

    fn load_all(&self) -> LoadOutcome {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let mut tables = ReferenceTables::default();
        let mut sales = SalesBatch::default();

        for kind in DatasetKind::LOAD_ORDER {
            let loader = self.factory.create(kind.as_str())?;
            self.invocations[kind.index()].fetch_add(1, Ordering::Relaxed);

            let stage_started = Instant::now();
            let reader = self.sources.open(kind)?;
            let dataset = loader.load(reader, &tables)?;
            info!(
                dataset = %kind,
                source = %self.sources.describe(kind),
                records = dataset.len(),
                elapsed_ms = stage_started.elapsed().as_millis() as u64,
                "Loaded dataset"
            );

            match dataset {
                LoadedDataset::Categories(categories) => tables.categories = categories,
                LoadedDataset::Products(products) => tables.products = products,
                LoadedDataset::Contacts(table) => {
                    tables.contacts = table.contacts;
                    tables.country_codes = table.country_codes;
                }
                LoadedDataset::Sales(batch) => sales = batch,
            }
        }

        let indices = Indices::build(tables, sales, self.factory.settings().sales_year)?;
        let summary = indices.summary();
        info!(
            sales_year = summary.sales_year,
            categories = summary.categories,
            products = summary.products,
            contacts = summary.contacts,
            sales = summary.sales,
            skipped_out_of_year = summary.skipped_out_of_year,
            skipped_non_positive = summary.skipped_non_positive,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Data store loaded"
        );
        Ok(Arc::new(indices))
    }
}
