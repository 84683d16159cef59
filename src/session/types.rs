//! Session cache types

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

// ============================================================================
// Constants
// ============================================================================

/// Idle time after which a session expires: 30 minutes
pub const DEFAULT_TTL_SECS: u64 = 30 * 60;

/// Aggregate size bound for all cached documents: 500MB
pub const MAX_CACHE_SIZE_BYTES: u64 = 500 * 1024 * 1024;

/// Largest single document the cache accepts: 500MB
pub const MAX_SINGLE_ENTRY_BYTES: u64 = 500 * 1024 * 1024;

/// Background sweep period
pub const SWEEP_INTERVAL_SECS: u64 = 60;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ============================================================================
// Configuration
// ============================================================================

/// Session cache limits
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Idle time before a session expires
    pub ttl: Duration,
    /// Aggregate size bound
    pub max_size_bytes: u64,
    /// Single document bound
    pub max_entry_bytes: u64,
    /// How often the sweeper runs
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_size_bytes: MAX_CACHE_SIZE_BYTES,
            max_entry_bytes: MAX_SINGLE_ENTRY_BYTES,
            sweep_interval: Duration::from_secs(SWEEP_INTERVAL_SECS),
        }
    }
}

impl CacheConfig {
    /// Largest document that can be stored without violating either bound
    pub fn effective_entry_limit(&self) -> u64 {
        self.max_entry_bytes.min(self.max_size_bytes)
    }
}

// ============================================================================
// Entries
// ============================================================================

/// A cached upload
///
/// Cloning is cheap: the PDF bytes are shared and never mutated once stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub pdf_bytes: Arc<Vec<u8>>,
    pub total_pages: usize,
    pub created_at: Instant,
    pub last_accessed: Instant,
}

impl CacheEntry {
    pub fn size_bytes(&self) -> u64 {
        self.pdf_bytes.len() as u64
    }

    /// Idle for strictly longer than `ttl` at `now`
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_accessed) > ttl
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Point-in-time snapshot of the cache
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub active_sessions: usize,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
    pub max_size_bytes: u64,
    pub max_size_mb: f64,
    pub ttl_seconds: u64,
}

impl CacheStats {
    pub(super) fn new(active_sessions: usize, total_size_bytes: u64, config: &CacheConfig) -> Self {
        Self {
            active_sessions,
            total_size_bytes,
            total_size_mb: to_mb(total_size_bytes),
            max_size_bytes: config.max_size_bytes,
            max_size_mb: to_mb(config.max_size_bytes),
            ttl_seconds: config.ttl.as_secs(),
        }
    }
}

fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

// ============================================================================
// Errors
// ============================================================================

/// Session cache errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Document too large for the session cache: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
}
