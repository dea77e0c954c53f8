//! Zest Well community health directory
//!
//! The clinic directory is a read-through cache: it serves a usable record
//! set whether the client is online or offline, refreshing from its source
//! when it can and falling back to persisted or bundled data when it cannot.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod directory;
pub mod export;
pub mod network;
pub mod refresh;
pub mod sanitize;
