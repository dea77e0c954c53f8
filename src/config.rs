//! Loader configuration
//!
//! Defaults suit the bundled source. Environment variables and then CLI
//! flags override them.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{FileStore, Persistence};
use crate::directory::{BundledSource, DirectoryLoader, HttpSource};
use crate::network::Reachability;

/// Environment variable naming the directory endpoint
pub const ENV_SOURCE_URL: &str = "ZESTWELL_SOURCE_URL";
/// Environment variable overriding the cache directory
pub const ENV_CACHE_DIR: &str = "ZESTWELL_CACHE_DIR";
/// Environment variable for the fetch timeout in seconds (0 disables it)
pub const ENV_FETCH_TIMEOUT_SECS: &str = "ZESTWELL_FETCH_TIMEOUT_SECS";

/// Errors in user-supplied configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' (expected a whole number of seconds)")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Settings used to build a [`DirectoryLoader`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Upper bound on a fresh fetch; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
    /// Artificial round trip for the bundled source
    pub simulated_latency: Duration,
    /// HTTP endpoint serving the directory; the bundled source is used when unset
    pub source_url: Option<String>,
    /// Cache directory; the XDG cache directory is used when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Some(Duration::from_secs(10)),
            simulated_latency: Duration::from_millis(100),
            source_url: None,
            cache_dir: None,
        }
    }
}

impl LoaderConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_SOURCE_URL).filter(|s| !s.trim().is_empty()) {
            config.source_url = Some(url);
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|s| !s.trim().is_empty()) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    var: ENV_FETCH_TIMEOUT_SECS,
                    value: value.clone(),
                })?;
            config.fetch_timeout = timeout_from_secs(secs);
        }

        Ok(config)
    }

    /// Persistence for the configured cache directory
    pub fn persistence(&self) -> Persistence {
        match &self.cache_dir {
            Some(dir) => Persistence::new(FileStore::with_dir(dir)),
            None => Persistence::default_location(),
        }
    }

    /// Builds a loader using the configured source and cache location
    pub fn build_loader(&self, reachability: impl Reachability + 'static) -> DirectoryLoader {
        let persistence = self.persistence();
        let loader = match &self.source_url {
            Some(url) => {
                DirectoryLoader::new(persistence, HttpSource::new(url.clone()), reachability)
            }
            None => DirectoryLoader::new(
                persistence,
                BundledSource::new(self.simulated_latency),
                reachability,
            ),
        };
        loader.with_fetch_timeout(self.fetch_timeout)
    }
}

/// Converts a seconds setting to a timeout, where 0 means no timeout
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
