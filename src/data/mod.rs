//! Core data models for the Zest Well directory
//!
//! This module contains the record types served by the clinic directory and
//! the community support group listings, plus the bundled datasets for both.

pub mod clinics;
pub mod groups;

pub use clinics::{default_records, BUNDLED_DATASET_VERSION};
pub use groups::{all_groups, find_group, groups_in_category};

use serde::{Deserialize, Serialize};

/// Geographic position of a clinic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude coordinate
    pub lat: f64,
    /// Longitude coordinate
    pub lng: f64,
}

/// One clinic or health service entry in the directory
///
/// The `id` is assigned by the data source and is never regenerated by the
/// cache, so it stays stable across fresh loads, persisted envelopes and the
/// bundled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Unique identifier for the clinic
    pub id: u32,
    /// Human-readable name of the clinic
    pub name: String,
    /// Suburb the clinic is located in
    pub suburb: String,
    /// Street address
    pub address: String,
    /// Services offered, in display order
    pub services: Vec<String>,
    /// Average community rating (0-5)
    pub rating: f64,
    /// Location of the clinic
    pub coordinates: Coordinates,
}

impl DirectoryRecord {
    /// Returns true if the suburb contains `needle`, ignoring case
    pub fn suburb_matches(&self, needle: &str) -> bool {
        self.suburb.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Returns true if any service tag contains `needle`, ignoring case
    pub fn offers_service(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.services
            .iter()
            .any(|service| service.to_lowercase().contains(&needle))
    }
}

/// A community support group that members can join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportGroup {
    /// Unique identifier for the group
    pub id: u32,
    /// Group name
    pub name: &'static str,
    /// What the group is about
    pub description: &'static str,
    /// Regular meeting slot
    pub meeting_time: &'static str,
    /// Current member count
    pub members: u32,
    /// Category slug (e.g. "mental-health")
    pub category: &'static str,
}
