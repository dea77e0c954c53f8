//! Directory loader: decides where the working set comes from
//!
//! Every load ends with a non-empty working set. Online, the loader fetches
//! fresh records and writes them through to persistence; offline, or when the
//! fetch fails, it serves the persisted envelope if it is younger than the
//! freshness window and the bundled defaults otherwise.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::source::{DirectorySource, FetchError};
use crate::cache::{CacheEnvelope, CacheStore, Persistence};
use crate::data::{default_records, DirectoryRecord, BUNDLED_DATASET_VERSION};
use crate::network::Reachability;

/// Persistence key for the directory envelope
pub const DIRECTORY_CACHE_KEY: &str = "zest-well-clinics";

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where the working set came from after a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Fetched from the directory source during this load
    Fresh,
    /// Read from a persisted envelope inside the freshness window
    Persisted,
    /// Bundled records compiled into the binary
    Defaults,
}

impl LoadOrigin {
    /// Whether this origin sets the cache-origin flag
    pub fn is_cached(self) -> bool {
        !matches!(self, LoadOrigin::Fresh)
    }
}

/// Read-through cache over the clinic directory
pub struct DirectoryLoader {
    store: CacheStore,
    persistence: Persistence,
    source: Arc<dyn DirectorySource>,
    reachability: Arc<dyn Reachability>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Option<Duration>,
    /// Held for the duration of a load so overlapping calls run in order
    load_lock: Mutex<()>,
}

impl DirectoryLoader {
    /// Creates a loader with an empty working set and no fetch timeout
    pub fn new(
        persistence: Persistence,
        source: impl DirectorySource + 'static,
        reachability: impl Reachability + 'static,
    ) -> Self {
        Self {
            store: CacheStore::new(),
            persistence,
            source: Arc::new(source),
            reachability: Arc::new(reachability),
            clock: Arc::new(SystemClock),
            fetch_timeout: None,
            load_lock: Mutex::new(()),
        }
    }

    /// Replaces the clock used for capture timestamps and expiry checks
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Bounds the fresh fetch; a timed-out fetch falls back to the cache
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Loads the directory, choosing between fresh, persisted and bundled data
    ///
    /// Never fails: every error path ends in a non-empty working set. If the
    /// returned future is dropped before completion, the previous working set
    /// stays in place.
    pub async fn load_directory(&self) -> LoadOrigin {
        let _guard = self.load_lock.lock().await;

        if !self.reachability.is_reachable() {
            tracing::debug!("offline, loading directory from cache");
            return self.load_from_cache().await;
        }

        match self.fetch_fresh().await {
            Ok(records) => {
                self.accept_fresh(records).await;
                LoadOrigin::Fresh
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load fresh directory, using cached data");
                self.load_from_cache().await
            }
        }
    }

    async fn fetch_fresh(&self) -> Result<Vec<DirectoryRecord>, FetchError> {
        let records = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch())
                .await
                .map_err(|_| FetchError::Timeout(limit))??,
            None => self.source.fetch().await?,
        };

        if records.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(records)
    }

    async fn accept_fresh(&self, records: Vec<DirectoryRecord>) {
        let envelope = CacheEnvelope::new(records.clone(), self.clock.now());
        tracing::info!(records = records.len(), "loaded fresh clinic data");

        self.store.set_working_set(records, false);
        self.persistence.write(DIRECTORY_CACHE_KEY, &envelope).await;
    }

    /// Serves the persisted envelope if usable, the bundled defaults otherwise.
    /// Defaults served here are never written back to persistence.
    async fn load_from_cache(&self) -> LoadOrigin {
        let now = self.clock.now();

        match self.persistence.read(DIRECTORY_CACHE_KEY).await {
            Some(envelope) if envelope.is_fresh(now) && !envelope.records.is_empty() => {
                tracing::info!(records = envelope.records.len(), "loaded clinics from cache");
                self.store.set_working_set(envelope.records, true);
                return LoadOrigin::Persisted;
            }
            Some(envelope) => {
                tracing::info!(
                    age_hours = envelope.age(now).num_hours(),
                    "directory cache expired, using bundled defaults"
                );
            }
            None => {
                tracing::info!("no directory cache, using bundled defaults");
            }
        }

        tracing::debug!(dataset_version = BUNDLED_DATASET_VERSION, "serving bundled clinics");
        self.store.set_working_set(default_records(), true);
        LoadOrigin::Defaults
    }

    /// Returns a copy of the current working set
    pub fn working_set(&self) -> Vec<DirectoryRecord> {
        self.store.working_set()
    }

    /// True when the working set did not come from a fresh fetch this cycle
    pub fn is_using_cached_data(&self) -> bool {
        self.store.is_using_cached_data()
    }

    /// Looks up a clinic in the working set by ID
    pub fn find_by_id(&self, id: u32) -> Option<DirectoryRecord> {
        self.store.find_by_id(id)
    }

    /// Clinics whose suburb contains `needle`, ignoring case
    pub fn find_by_suburb(&self, needle: &str) -> Vec<DirectoryRecord> {
        self.store.find_by_suburb(needle)
    }

    /// Clinics offering a service that contains `needle`, ignoring case
    pub fn find_by_service(&self, needle: &str) -> Vec<DirectoryRecord> {
        self.store.find_by_service(needle)
    }

    /// Deletes the persisted envelope. The in-memory working set is kept.
    pub async fn clear_cache(&self) {
        self.persistence.clear(DIRECTORY_CACHE_KEY).await;
        tracing::info!("clinic cache cleared");
    }
}
