//! Command-line interface parsing for the Zest Well directory
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into loader settings and cleaned search terms.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{timeout_from_secs, LoaderConfig};
use crate::data::{DirectoryRecord, SupportGroup, BUNDLED_DATASET_VERSION};
use crate::directory::LoadOrigin;
use crate::sanitize::sanitize;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Search text was empty once markup was removed
    #[error("Invalid search text: '{0}'. Provide some plain text to search for")]
    EmptySearch(String),
}

/// Zest Well - find community health services and support groups
#[derive(Parser, Debug)]
#[command(name = "zestwell")]
#[command(about = "Community health services directory with offline support")]
#[command(version)]
pub struct Cli {
    /// Treat the network as unreachable and serve cached or bundled data
    #[arg(long, global = true)]
    pub offline: bool,

    /// Directory for the clinic cache (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// HTTP endpoint serving the clinic directory as JSON
    #[arg(long, value_name = "URL", global = true)]
    pub source_url: Option<String>,

    /// Fetch timeout in seconds (0 waits indefinitely)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do once the directory is loaded
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List every clinic
    List,
    /// Show one clinic by ID
    Show { id: u32 },
    /// Find clinics whose suburb contains TEXT
    Suburb { text: String },
    /// Find clinics offering a service containing TEXT
    Service { text: String },
    /// List community support groups
    Groups {
        /// Only show groups in this category (e.g. mental-health)
        #[arg(long)]
        category: Option<String>,
    },
    /// Export clinics or groups as CSV
    Export {
        #[arg(value_enum)]
        dataset: Dataset,
        /// Write to FILE instead of standard output
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Delete the persisted clinic cache
    ClearCache,
    /// Keep running and reload the directory in the background
    Watch {
        /// Seconds between periodic reloads
        #[arg(long, default_value_t = 1800)]
        interval: u64,
    },
}

/// Exportable datasets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Clinics,
    Groups,
}

impl Cli {
    /// Overlays CLI flags onto a base configuration
    pub fn loader_config(&self, base: LoaderConfig) -> LoaderConfig {
        let mut config = base;
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(url) = &self.source_url {
            config.source_url = Some(url.clone());
        }
        if let Some(secs) = self.timeout {
            config.fetch_timeout = timeout_from_secs(secs);
        }
        config
    }
}

/// Strips markup from a search argument
///
/// # Returns
/// * `Ok(String)` with the trimmed, plain-text search term
/// * `Err(CliError::EmptySearch)` if nothing is left
pub fn search_term(raw: &str) -> Result<String, CliError> {
    let cleaned = sanitize(raw).trim().to_string();
    if cleaned.is_empty() {
        return Err(CliError::EmptySearch(raw.to_string()));
    }
    Ok(cleaned)
}

/// One-line summary of a clinic
pub fn render_record(record: &DirectoryRecord) -> String {
    format!(
        "[{}] {} - {} ({}) rating {:.1}\n    {}",
        record.id,
        record.name,
        record.suburb,
        record.address,
        record.rating,
        record.services.join(", ")
    )
}

/// One-line summary of a support group
pub fn render_group(group: &SupportGroup) -> String {
    format!(
        "[{}] {} - {} ({} members, {})\n    {}",
        group.id, group.name, group.meeting_time, group.members, group.category, group.description
    )
}

/// Notice printed when the working set is not fresh, if any
pub fn origin_notice(origin: LoadOrigin) -> Option<String> {
    match origin {
        LoadOrigin::Fresh => None,
        LoadOrigin::Persisted => Some("Showing cached clinic data (offline mode)".to_string()),
        LoadOrigin::Defaults => Some(format!(
            "Showing built-in clinic data v{} (offline mode)",
            BUNDLED_DATASET_VERSION
        )),
    }
}
