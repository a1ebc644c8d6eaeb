//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries in the filtered-list cache region
    pub filtered_max_entries: usize,
    /// Filtered-list entry lifetime in seconds, counted from the write
    pub filtered_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Page size used when a paged listing does not specify one
    pub default_page_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `FILTERED_CACHE_MAX_ENTRIES` - Filtered-list region capacity (default: 100, 0 caches nothing)
    /// - `FILTERED_CACHE_TTL` - Filtered-list entry TTL in seconds (default: 600)
    /// - `CLEANUP_INTERVAL` - Expired entry sweep frequency in seconds (default: 60, 0 sweeps at the minimum interval)
    /// - `DEFAULT_PAGE_SIZE` - Page size for paged listings (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            filtered_max_entries: env_or("FILTERED_CACHE_MAX_ENTRIES", defaults.filtered_max_entries),
            filtered_ttl: env_or("FILTERED_CACHE_TTL", defaults.filtered_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", defaults.default_page_size),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            filtered_max_entries: 100,
            filtered_ttl: 600,
            cleanup_interval: 60,
            default_page_size: 10,
        }
    }
}
