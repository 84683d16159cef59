//! Configuration management for the BMS PDF server

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::classifier::{ClassifierConfig, INDEX_SCAN_PAGES, VISUAL_CONCURRENCY, VISUAL_DPI};
use crate::session::{
    CacheConfig, DEFAULT_TTL_SECS, MAX_CACHE_SIZE_BYTES, MAX_SINGLE_ENTRY_BYTES,
    SWEEP_INTERVAL_SECS,
};

/// Lowest render resolution accepted from clients
pub const MIN_DPI: u32 = 18;

const DEFAULT_PORT: u16 = 8000;

/// Enough for the base64 form of the largest cacheable document
const DEFAULT_MAX_BODY_BYTES: usize = 700 * 1024 * 1024;

const DEFAULT_RENDER_DPI: u32 = 150;
const DEFAULT_MAX_DPI: u32 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheSettings,
    pub classifier: ClassifierSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_size_bytes: u64,
    pub max_entry_bytes: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    pub index_scan_pages: usize,
    pub visual_dpi: u32,
    pub visual_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSettings {
    pub default_dpi: u32,
    pub max_dpi: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            cache: CacheSettings {
                ttl_secs: DEFAULT_TTL_SECS,
                max_size_bytes: MAX_CACHE_SIZE_BYTES,
                max_entry_bytes: MAX_SINGLE_ENTRY_BYTES,
                sweep_interval_secs: SWEEP_INTERVAL_SECS,
            },
            classifier: ClassifierSettings {
                index_scan_pages: INDEX_SCAN_PAGES,
                visual_dpi: VISUAL_DPI,
                visual_concurrency: VISUAL_CONCURRENCY,
            },
            render: RenderSettings {
                default_dpi: DEFAULT_RENDER_DPI,
                max_dpi: DEFAULT_MAX_DPI,
            },
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; missing or unparseable
    /// values fall back to their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key);

        let config = Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(var("SERVER_PORT"), defaults.server.port),
                max_body_bytes: parse_or(var("MAX_BODY_BYTES"), defaults.server.max_body_bytes),
            },
            cache: CacheSettings {
                ttl_secs: parse_or(var("CACHE_TTL_SECS"), defaults.cache.ttl_secs),
                max_size_bytes: parse_or(var("CACHE_MAX_SIZE_BYTES"), defaults.cache.max_size_bytes),
                max_entry_bytes: parse_or(
                    var("CACHE_MAX_ENTRY_BYTES"),
                    defaults.cache.max_entry_bytes,
                ),
                sweep_interval_secs: parse_or(
                    var("CACHE_SWEEP_INTERVAL_SECS"),
                    defaults.cache.sweep_interval_secs,
                ),
            },
            classifier: ClassifierSettings {
                index_scan_pages: parse_or(
                    var("CLASSIFIER_INDEX_SCAN_PAGES"),
                    defaults.classifier.index_scan_pages,
                ),
                visual_dpi: parse_or(var("CLASSIFIER_VISUAL_DPI"), defaults.classifier.visual_dpi),
                visual_concurrency: parse_or(
                    var("CLASSIFIER_VISUAL_CONCURRENCY"),
                    defaults.classifier.visual_concurrency,
                ),
            },
            render: RenderSettings {
                default_dpi: parse_or(var("RENDER_DEFAULT_DPI"), defaults.render.default_dpi),
                max_dpi: parse_or(var("RENDER_MAX_DPI"), defaults.render.max_dpi),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 || self.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache TTL and sweep interval must be positive".to_string(),
            ));
        }
        if self.cache.max_size_bytes == 0 {
            return Err(ConfigError::Invalid("cache size bound must be positive".to_string()));
        }
        if self.classifier.visual_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "visual classification concurrency must be positive".to_string(),
            ));
        }
        if self.render.max_dpi < MIN_DPI
            || !(MIN_DPI..=self.render.max_dpi).contains(&self.render.default_dpi)
        {
            return Err(ConfigError::Invalid(format!(
                "render DPI must satisfy {} <= default ({}) <= max ({})",
                MIN_DPI, self.render.default_dpi, self.render.max_dpi
            )));
        }
        Ok(())
    }

    /// Session cache limits
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_size_bytes: self.cache.max_size_bytes,
            max_entry_bytes: self.cache.max_entry_bytes,
            sweep_interval: Duration::from_secs(self.cache.sweep_interval_secs),
        }
    }

    /// Classifier tuning
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            index_scan_pages: self.classifier.index_scan_pages,
            visual_dpi: self.classifier.visual_dpi,
            visual_concurrency: self.classifier.visual_concurrency,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
