//! Cache module for the clinic directory
//!
//! This module holds the in-memory working set, the versioned envelope that
//! gets persisted between sessions, and the best-effort persistence adapter
//! that stores it. Expired or unreadable envelopes are never surfaced; the
//! directory loader decides what to serve instead.

mod envelope;
mod persistence;
mod store;

pub use envelope::{
    freshness_window, CacheEnvelope, EnvelopeError, FRESHNESS_WINDOW_MS, SCHEMA_VERSION,
};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, Persistence, PersistenceError};
pub use store::CacheStore;
