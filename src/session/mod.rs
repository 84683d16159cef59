//! Session cache for uploaded PDFs
//!
//! A client uploads a document once and then addresses it by session id for
//! page renders and classification. Sessions expire after a period of
//! inactivity and the least recently used ones are evicted when the cache
//! reaches its size bound.

mod cache;
mod types;

pub use cache::SessionCache;
pub use types::{
    CacheConfig, CacheEntry, CacheError, CacheStats, DEFAULT_TTL_SECS, MAX_CACHE_SIZE_BYTES,
    MAX_SINGLE_ENTRY_BYTES, SWEEP_INTERVAL_SECS,
};
