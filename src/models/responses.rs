//! Response DTOs for the policy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// One page of a listing ordered by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub content: Vec<T>,
    /// Zero-based page index
    pub page: usize,
    /// Requested page size
    pub size: usize,
    /// Number of items across all pages
    pub total_elements: usize,
    /// Number of pages
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Cuts page `page` of `size` items out of the full ordered listing.
    pub fn slice(items: &[T], page: usize, size: usize) -> Self {
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(size);
        let content = items
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect();

        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

/// Counters and size of a single cache region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionStatsResponse {
    /// Region name
    pub region: &'static str,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of capacity evictions
    pub evictions: u64,
    /// Number of entries dropped after their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the region
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl RegionStatsResponse {
    /// Creates a new RegionStatsResponse from region statistics
    pub fn new(region: &'static str, stats: &CacheStats) -> Self {
        Self {
            region,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub regions: Vec<RegionStatsResponse>,
}

/// Response body for the cache clear endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of entries dropped across all regions
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("Cleared {} cached entries", cleared),
            cleared,
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
