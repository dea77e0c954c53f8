//! Clinic directory: sources and the read-through loader
//!
//! The loader serves a working set whether the client is online or offline,
//! refreshing it from a [`DirectorySource`] when it can and falling back to
//! the persisted envelope or the bundled records when it cannot.

mod loader;
mod source;

pub use loader::{Clock, DirectoryLoader, LoadOrigin, SystemClock, DIRECTORY_CACHE_KEY};
pub use source::{parse_records, BundledSource, DirectorySource, FetchError, HttpSource};
