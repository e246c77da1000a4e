//! Error types for salesdex operations

use crate::DatasetKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where in a dataset a bad record sits.
///
/// `index` is the zero-based position in the top-level array. Line and column
/// are best-effort and only present when the JSON decoder reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPosition {
    pub index: usize,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl RecordPosition {
    pub fn at_index(index: usize) -> Self {
        Self {
            index,
            line: None,
            column: None,
        }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{}", self.index)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " (line {}, column {})", line, column)?;
        }
        Ok(())
    }
}

/// Dataset loading errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Malformed {dataset} dataset at {position}: {reason}")]
    DatasetMalformed {
        dataset: DatasetKind,
        position: RecordPosition,
        reason: String,
    },

    #[error("Unknown dataset type: {name}")]
    UnknownDatasetType { name: String },

    #[error("Cannot read {dataset} dataset from {location}: {reason}")]
    SourceUnavailable {
        dataset: DatasetKind,
        location: String,
        reason: String,
    },
}

/// Data store and cache coordination errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Data store not loaded")]
    NotLoaded,

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Computation for {operation} ended without producing a result")]
    ComputationAbandoned { operation: String },

    #[error("Sale {sale_id} references unknown {entity} {id}")]
    UnresolvedReference {
        sale_id: i64,
        entity: &'static str,
        id: i64,
    },
}

/// Aggregation query errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("No sales found for {operation} with key {key}")]
    EmptyResult { operation: String, key: String },

    #[error("Invalid value for {name}: {value} - {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all salesdex errors.
///
/// Every variant is `Clone` so one failed load or computation can be handed
/// to all callers that were waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SalesdexError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SalesdexError {
    /// True for the expected "nothing matched" outcome of a query.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SalesdexError::Query(QueryError::EmptyResult { .. }))
    }

    /// True when indices were requested before a successful load.
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, SalesdexError::Store(StoreError::NotLoaded))
    }

    /// True for any malformed-record failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SalesdexError::Load(LoadError::DatasetMalformed { .. }))
    }
}

/// Result type alias for salesdex operations.
pub type SalesdexResult<T> = Result<T, SalesdexError>;

// =============================================================================
// TESTS
// =============================================================================
