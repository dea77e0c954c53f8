//! Versioned on-disk envelope for the clinic directory
//!
//! An envelope is the unit that gets persisted: the full record sequence plus
//! the moment it was accepted into the store. The wire form is JSON with the
//! capture time as epoch milliseconds.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::DirectoryRecord;

/// Current envelope schema. Envelopes carrying any other version are discarded.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum age of a usable envelope, in milliseconds (24 hours)
pub const FRESHNESS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Returns the freshness window as a chrono duration
pub fn freshness_window() -> Duration {
    Duration::milliseconds(FRESHNESS_WINDOW_MS)
}

/// Errors that can occur when encoding or decoding an envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Payload is not valid envelope JSON
    #[error("Failed to parse envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was written by an incompatible schema
    #[error(
        "Unsupported envelope schema version: {found:?} (expected {expected})",
        expected = SCHEMA_VERSION
    )]
    SchemaMismatch { found: Option<u32> },
}

/// Persisted snapshot of the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// Schema the envelope was written with
    pub schema_version: u32,
    /// When the records were accepted into the store
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    /// The full record sequence
    pub records: Vec<DirectoryRecord>,
}

/// Only the version field, read before committing to a full parse
#[derive(Deserialize)]
struct SchemaProbe {
    #[serde(default)]
    schema_version: Option<u32>,
}

impl CacheEnvelope {
    /// Creates an envelope at the current schema version
    pub fn new(records: Vec<DirectoryRecord>, captured_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            captured_at,
            records,
        }
    }

    /// Age of the envelope relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.captured_at
    }

    /// Whether the envelope is still inside the freshness window at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.age(now).num_milliseconds() < FRESHNESS_WINDOW_MS
    }

    /// Serializes the envelope to its JSON wire form
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses an envelope, rejecting payloads from other schema versions
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let probe: SchemaProbe = serde_json::from_slice(bytes)?;
        if probe.schema_version != Some(SCHEMA_VERSION) {
            return Err(EnvelopeError::SchemaMismatch {
                found: probe.schema_version,
            });
        }

        Ok(serde_json::from_slice(bytes)?)
    }
}
