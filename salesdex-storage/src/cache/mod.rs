//! Result cache for aggregate queries.
//!
//! Reads return [`CacheRead<T>`], which says whether the value was served
//! from the cache, computed by this caller, or shared from a concurrent
//! caller's computation, and when it was computed.

pub mod freshness;
pub mod key;
pub mod result_cache;
pub mod stats;

pub use freshness::{CacheRead, ReadOrigin};
pub use key::CacheKey;
pub use result_cache::{CacheConfig, ResultCache};
pub use stats::CacheStats;
