//! In-memory working set for the clinic directory

use std::sync::{Arc, PoisonError, RwLock};

use crate::data::DirectoryRecord;

#[derive(Debug, Default)]
struct WorkingSet {
    records: Arc<Vec<DirectoryRecord>>,
    using_cached_data: bool,
}

/// Holds the active record sequence and whether it came from a cache
///
/// Every update swaps the whole set and its origin flag in one assignment, so
/// readers see either the previous set or the new one, never a mix.
#[derive(Debug, Default)]
pub struct CacheStore {
    current: RwLock<WorkingSet>,
}

impl CacheStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current working set (empty before the first load)
    pub fn working_set(&self) -> Vec<DirectoryRecord> {
        self.snapshot().as_ref().clone()
    }

    /// Returns a shared handle to the current working set
    pub fn snapshot(&self) -> Arc<Vec<DirectoryRecord>> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current.records)
    }

    /// Replaces the working set and cache-origin flag together
    pub fn set_working_set(&self, records: Vec<DirectoryRecord>, using_cached_data: bool) {
        let replacement = WorkingSet {
            records: Arc::new(records),
            using_cached_data,
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = replacement;
    }

    /// True when the working set did not come from a fresh fetch this cycle
    pub fn is_using_cached_data(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .using_cached_data
    }

    /// Looks up a record by its identifier
    pub fn find_by_id(&self, id: u32) -> Option<DirectoryRecord> {
        self.snapshot().iter().find(|record| record.id == id).cloned()
    }

    /// Records whose suburb contains `needle`, ignoring case
    pub fn find_by_suburb(&self, needle: &str) -> Vec<DirectoryRecord> {
        self.snapshot()
            .iter()
            .filter(|record| record.suburb_matches(needle))
            .cloned()
            .collect()
    }

    /// Records offering a service that contains `needle`, ignoring case
    pub fn find_by_service(&self, needle: &str) -> Vec<DirectoryRecord> {
        self.snapshot()
            .iter()
            .filter(|record| record.offers_service(needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_records;

    fn loaded_store() -> CacheStore {
        let store = CacheStore::new();
        store.set_working_set(default_records(), false);
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = CacheStore::new();

        assert!(store.working_set().is_empty());
        assert!(!store.is_using_cached_data());
        assert!(store.find_by_id(1).is_none());
    }

    #[test]
    fn test_set_working_set_replaces_records_and_flag() {
        let store = loaded_store();
        assert_eq!(store.working_set().len(), 6);
        assert!(!store.is_using_cached_data());

        let subset = default_records()[..2].to_vec();
        store.set_working_set(subset.clone(), true);

        assert_eq!(store.working_set(), subset);
        assert!(store.is_using_cached_data());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_replacement() {
        let store = loaded_store();
        let before = store.snapshot();

        store.set_working_set(Vec::new(), true);

        assert_eq!(before.len(), 6);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let store = loaded_store();

        let clinic = store.find_by_id(3).expect("Clinic 3 should exist");
        assert_eq!(clinic.name, "Fitzroy Health Hub");
        assert!(store.find_by_id(7).is_none());
    }

    #[test]
    fn test_find_by_suburb_rich_returns_only_richmond() {
        let store = loaded_store();

        let matches = store.find_by_suburb("rich");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].suburb, "Richmond");
    }

    #[test]
    fn test_find_by_suburb_is_case_insensitive() {
        let store = loaded_store();

        assert_eq!(store.find_by_suburb("ST KILDA").len(), 1);
        assert!(store.find_by_suburb("Carlton").is_empty());
    }

    #[test]
    fn test_find_by_service_matches_any_tag() {
        let store = loaded_store();

        let dental: Vec<u32> = store.find_by_service("dental").iter().map(|r| r.id).collect();
        assert_eq!(dental, vec![1, 4, 6]);

        let womens: Vec<u32> = store.find_by_service("women").iter().map(|r| r.id).collect();
        assert_eq!(womens, vec![2, 6]);

        assert_eq!(store.find_by_service("practice").len(), 6);
        assert!(store.find_by_service("physiotherapy").is_empty());
    }
}
