use serde::{Deserialize, Serialize};

/// Statistics about result cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads served from an unexpired entry.
    pub hits: u64,
    /// Reads that ran the computation.
    pub misses: u64,
    /// Reads that waited on another caller's computation.
    pub coalesced: u64,
    /// Entries dropped for capacity or expiry.
    pub evictions: u64,
    /// Ready entries currently held.
    pub entry_count: u64,
}

impl CacheStats {
    /// Share of reads that avoided running a computation (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 70,
            coalesced: 10,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
