//! Session Cache
//!
//! Keeps uploaded PDFs in memory between requests with:
//! - One mutex guarding both the entry map and the byte counter
//! - Lazy expiry on lookup plus a periodic background sweep
//! - Least-recently-accessed eviction once the aggregate size bound is hit
//!
//! The LRU order and `last_accessed` always agree: every touch happens under
//! the lock, stamps the current time and moves the entry to the front. The
//! expired entries therefore form a contiguous run at the LRU end.

use std::sync::{Arc, Weak};

use lru::LruCache;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::types::{CacheConfig, CacheEntry, CacheError, CacheStats};

// ============================================================================
// Session Cache
// ============================================================================

/// In-memory store of uploaded PDFs keyed by session id
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<SessionCacheInner>,
}

struct SessionCacheInner {
    registry: Mutex<Registry>,
    config: CacheConfig,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

struct Registry {
    /// Front is most recently accessed
    entries: LruCache<String, CacheEntry>,
    total_bytes: u64,
}

impl Registry {
    fn remove(&mut self, session_id: &str) -> Option<CacheEntry> {
        let entry = self.entries.pop(session_id)?;
        self.total_bytes -= entry.size_bytes();
        Some(entry)
    }

    fn remove_lru(&mut self) -> Option<(String, CacheEntry)> {
        let (id, entry) = self.entries.pop_lru()?;
        self.total_bytes -= entry.size_bytes();
        Some((id, entry))
    }
}

impl SessionCache {
    /// Create a cache with the given limits
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(SessionCacheInner {
                registry: Mutex::new(Registry {
                    entries: LruCache::unbounded(),
                    total_bytes: 0,
                }),
                config,
                sweeper: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // ========================================================================
    // Session Lifecycle
    // ========================================================================

    /// Store a document and return its new session id
    ///
    /// Evicts least-recently-accessed sessions until the document fits.
    pub fn store(&self, pdf_bytes: Arc<Vec<u8>>, total_pages: usize) -> Result<String, CacheError> {
        let config = &self.inner.config;
        let size = pdf_bytes.len() as u64;
        let limit = config.effective_entry_limit();

        if size > limit {
            tracing::warn!(size_bytes = size, limit_bytes = limit, "Rejected oversized document");
            return Err(CacheError::TooLarge { size, limit });
        }

        let mut registry = self.inner.registry.lock();

        while registry.total_bytes + size > config.max_size_bytes {
            match registry.remove_lru() {
                Some((evicted_id, evicted)) => {
                    tracing::info!(
                        session_id = %evicted_id,
                        size_bytes = evicted.size_bytes(),
                        "Evicted least recently used session"
                    );
                }
                None => break,
            }
        }

        let session_id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !registry.entries.contains(&candidate) {
                break candidate;
            }
        };

        let now = Instant::now();
        registry.entries.put(
            session_id.clone(),
            CacheEntry {
                pdf_bytes,
                total_pages,
                created_at: now,
                last_accessed: now,
            },
        );
        registry.total_bytes += size;

        tracing::info!(
            session_id = %session_id,
            size_bytes = size,
            total_pages,
            total_bytes = registry.total_bytes,
            "Stored session"
        );

        Ok(session_id)
    }

    /// Look up a session, refreshing its access time
    ///
    /// Returns `None` for unknown ids and for sessions idle past the TTL,
    /// removing the latter on the spot.
    pub fn get(&self, session_id: &str) -> Option<CacheEntry> {
        let ttl = self.inner.config.ttl;
        let mut registry = self.inner.registry.lock();
        let now = Instant::now();

        let expired = registry.entries.peek(session_id)?.is_expired(now, ttl);
        if expired {
            registry.remove(session_id);
            tracing::info!(session_id = %session_id, "Session expired on access");
            return None;
        }

        let entry = registry.entries.get_mut(session_id)?;
        entry.last_accessed = now;
        Some(entry.clone())
    }

    /// Remove a session; `true` if it existed
    pub fn delete(&self, session_id: &str) -> bool {
        let removed = self.inner.registry.lock().remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Deleted session");
        }
        removed
    }

    // ========================================================================
    // Query Methods
    // ========================================================================

    /// Snapshot of the current occupancy
    pub fn stats(&self) -> CacheStats {
        let registry = self.inner.registry.lock();
        CacheStats::new(registry.entries.len(), registry.total_bytes, &self.inner.config)
    }

    pub fn len(&self) -> usize {
        self.inner.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Remove every expired session
    ///
    /// Returns the number of sessions removed
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.inner.config.ttl;
        let mut registry = self.inner.registry.lock();
        let now = Instant::now();
        let mut count = 0;

        while let Some((_, oldest)) = registry.entries.peek_lru() {
            if !oldest.is_expired(now, ttl) {
                break;
            }
            if let Some((session_id, _)) = registry.remove_lru() {
                tracing::debug!(session_id = %session_id, "Swept expired session");
                count += 1;
            }
        }

        if count > 0 {
            tracing::info!(count, remaining = registry.entries.len(), "Swept expired sessions");
        }

        count
    }

    /// Start the periodic sweep
    ///
    /// Must be called from within a tokio runtime. Calling it again while a
    /// sweeper is running is a no-op.
    pub fn start_sweeper(&self) {
        let mut slot = self.inner.sweeper.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let period = self.inner.config.sweep_interval;
        let weak: Weak<SessionCacheInner> = Arc::downgrade(&self.inner);

        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);

            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                SessionCache { inner }.sweep_expired();
            }
        }));

        tracing::info!(interval_secs = period.as_secs(), "Started session sweeper");
    }

    /// Stop the periodic sweep
    pub fn shutdown(&self) {
        if let Some(handle) = self.inner.sweeper.lock().take() {
            handle.abort();
            tracing::info!("Stopped session sweeper");
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.inner
            .sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Drop for SessionCacheInner {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
