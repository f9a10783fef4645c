//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Objects admitted into the cache
    pub insertions: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Objects refused for exceeding the whole cache
    pub too_large: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Current cached bytes
    pub total_bytes: usize,
    /// Aggregate capacity in bytes
    pub max_cache_size: usize,
    /// Per-object cacheability ceiling in bytes
    pub max_object_size: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics and bounds
    pub fn new(stats: &CacheStats, max_cache_size: usize, max_object_size: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            insertions: stats.insertions,
            evictions: stats.evictions,
            too_large: stats.too_large,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            max_cache_size,
            max_object_size,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(&stats, 1000, 100);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.max_cache_size, 1000);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(&CacheStats::default(), 1000, 100);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_stats_response_serialize() {
        let stats = CacheStats {
            total_entries: 3,
            total_bytes: 1500,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(StatsResponse::new(&stats, 4096, 1024)).unwrap();
        assert_eq!(json["total_entries"], 3);
        assert_eq!(json["total_bytes"], 1500);
        assert_eq!(json["max_object_size"], 1024);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
