//! Application state management

use std::sync::Arc;

use crate::classifier::PageClassifier;
use crate::config::Config;
use crate::document::DocumentLoader;
use crate::mupdf::MupdfLoader;
use crate::session::SessionCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    sessions: SessionCache,
    loader: Arc<dyn DocumentLoader>,
    classifier: PageClassifier,
}

impl AppState {
    /// Create state backed by MuPDF
    pub fn new(config: Config) -> Self {
        Self::with_loader(config, Arc::new(MupdfLoader))
    }

    /// Create state with a custom document loader
    pub fn with_loader(config: Config, loader: Arc<dyn DocumentLoader>) -> Self {
        let sessions = SessionCache::new(config.cache_config());
        let classifier = PageClassifier::new(config.classifier_config());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                loader,
                classifier,
            }),
        }
    }

    /// Start background work (the session sweeper)
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.inner.sessions.start_sweeper();
    }

    /// Stop background work
    pub fn shutdown(&self) {
        self.inner.sessions.shutdown();
        tracing::info!(
            active_sessions = self.inner.sessions.len(),
            "Application state shut down"
        );
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the session cache
    pub fn sessions(&self) -> &SessionCache {
        &self.inner.sessions
    }

    /// Get the document loader
    pub fn loader(&self) -> Arc<dyn DocumentLoader> {
        Arc::clone(&self.inner.loader)
    }

    /// Get the page classifier
    pub fn classifier(&self) -> &PageClassifier {
        &self.inner.classifier
    }
}
