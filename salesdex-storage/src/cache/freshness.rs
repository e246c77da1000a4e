//! Freshness metadata for cache reads.
//!
//! Every read from the result cache says where the value came from and how
//! old it is, so callers never mistake a cached answer for a fresh one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a cache read was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadOrigin {
    /// Served from an unexpired entry without running the computation.
    Hit,
    /// This caller ran the computation.
    Computed,
    /// Another caller was already computing the same key; this one waited.
    Coalesced,
}

impl ReadOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadOrigin::Hit => "hit",
            ReadOrigin::Computed => "miss",
            ReadOrigin::Coalesced => "coalesced",
        }
    }
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    /// When the value was computed.
    cached_at: DateTime<Utc>,
    /// When the entry stops being served.
    expires_at: DateTime<Utc>,
    origin: ReadOrigin,
}

impl<T> CacheRead<T> {
    pub(crate) fn new(
        value: T,
        cached_at: DateTime<Utc>,
        ttl: Duration,
        origin: ReadOrigin,
    ) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            value,
            cached_at,
            expires_at,
            origin,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn origin(&self) -> ReadOrigin {
        self.origin
    }

    /// True when no computation ran for this read.
    pub fn was_cache_hit(&self) -> bool {
        self.origin == ReadOrigin::Hit
    }

    /// Time since the value was computed.
    pub fn staleness(&self) -> Duration {
        let now = Utc::now();
        if now > self.cached_at {
            (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            expires_at: self.expires_at,
            origin: self.origin,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_follows_ttl() {
        let cached_at = Utc::now();
        let read = CacheRead::new(5, cached_at, Duration::from_secs(300), ReadOrigin::Computed);
        assert_eq!(read.expires_at() - read.cached_at(), chrono::Duration::seconds(300));
        assert!(!read.was_cache_hit());
        assert!(read.staleness() < Duration::from_secs(5));
    }

    #[test]
    fn test_map_keeps_metadata() {
        let read = CacheRead::new("7", Utc::now(), Duration::from_secs(1), ReadOrigin::Hit);
        let cached_at = read.cached_at();
        let mapped = read.map(|v| v.len());
        assert_eq!(*mapped.value(), 1);
        assert_eq!(mapped.cached_at(), cached_at);
        assert!(mapped.was_cache_hit());
    }

    #[test]
    fn test_origin_labels() {
        assert_eq!(ReadOrigin::Hit.as_str(), "hit");
        assert_eq!(ReadOrigin::Computed.as_str(), "miss");
        assert_eq!(ReadOrigin::Coalesced.as_str(), "coalesced");
    }
}
