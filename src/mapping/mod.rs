//! Identifier mapping for restores
//!
//! Records, per resource type, which identifier the target org assigned to
//! each object that existed in the backup. The whole table is rewritten to
//! disk after every mutation, so an interrupted restore loses at most the
//! mapping that was being added and can be resumed from the file.
//!
//! File format:
//!
//! ```json
//! { "group": { "00g_old": "00g_new" }, "user": { ... } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{EnvsyncError, EnvsyncResult};
use crate::storage::file_io::{read_json_required, write_json_atomic};

/// File name of the mapping inside a backup root
pub const MAPPING_FILE_NAME: &str = "id_mapping.json";

type Mappings = BTreeMap<String, BTreeMap<String, String>>;

/// Durable old-ID to new-ID table
#[derive(Debug, Clone)]
pub struct IdMappingStore {
    mappings: Mappings,
    path: PathBuf,
}

impl IdMappingStore {
    /// Create an empty store that persists to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            mappings: Mappings::new(),
            path: path.into(),
        }
    }

    /// Load a store from `path`
    ///
    /// A missing file yields an empty store. A file that cannot be parsed is
    /// a fatal error.
    pub fn load(path: impl Into<PathBuf>) -> EnvsyncResult<Self> {
        let path = path.into();

        if !path.exists() {
            return Ok(Self::new(path));
        }

        let mappings: Mappings = read_json_required(&path).map_err(|e| {
            EnvsyncError::Persistence(format!("Failed to load ID mapping: {}", e))
        })?;

        Ok(Self { mappings, path })
    }

    /// Record `old_id -> new_id` for `resource` and persist the whole table
    ///
    /// The in-memory entry is kept even if persisting fails.
    pub fn add_mapping(&mut self, resource: &str, old_id: &str, new_id: &str) -> EnvsyncResult<()> {
        self.mappings
            .entry(resource.to_string())
            .or_default()
            .insert(old_id.to_string(), new_id.to_string());

        self.save()
    }

    /// Look up the new identifier for `old_id`
    pub fn get_new_id(&self, resource: &str, old_id: &str) -> Option<&str> {
        self.mappings
            .get(resource)
            .and_then(|ids| ids.get(old_id))
            .map(String::as_str)
    }

    /// Write the full table to disk
    pub fn save(&self) -> EnvsyncResult<()> {
        write_json_atomic(&self.path, &self.mappings)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of mappings for one resource type
    pub fn count(&self, resource: &str) -> usize {
        self.mappings.get(resource).map_or(0, BTreeMap::len)
    }

    /// Per-type mapping counts, in resource name order
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.mappings
            .iter()
            .map(|(resource, ids)| (resource.as_str(), ids.len()))
            .collect()
    }

    /// Total number of mappings
    pub fn len(&self) -> usize {
        self.mappings.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = IdMappingStore::load(temp_dir.path().join(MAPPING_FILE_NAME)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_mapping_persists_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MAPPING_FILE_NAME);

        let mut store = IdMappingStore::new(&path);
        store.add_mapping("group", "g1", "newG1").unwrap();

        let reloaded = IdMappingStore::load(&path).unwrap();
        assert_eq!(reloaded.get_new_id("group", "g1"), Some("newG1"));
    }

    #[test]
    fn test_add_mapping_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = IdMappingStore::new(temp_dir.path().join(MAPPING_FILE_NAME));

        store.add_mapping("group", "g1", "first").unwrap();
        store.add_mapping("group", "g1", "second").unwrap();

        assert_eq!(store.get_new_id("group", "g1"), Some("second"));
        assert_eq!(store.count("group"), 1);
    }

    #[test]
    fn test_lookup_misses() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = IdMappingStore::new(temp_dir.path().join(MAPPING_FILE_NAME));
        store.add_mapping("group", "g1", "newG1").unwrap();

        assert_eq!(store.get_new_id("user", "g1"), None);
        assert_eq!(store.get_new_id("group", "g2"), None);
    }

    #[test]
    fn test_reload_then_save_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MAPPING_FILE_NAME);

        let mut store = IdMappingStore::new(&path);
        store.add_mapping("user", "u1", "newU1").unwrap();
        store.add_mapping("group", "g2", "newG2").unwrap();
        store.add_mapping("group", "g1", "newG1").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let reloaded = IdMappingStore::load(&path).unwrap();
        reloaded.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MAPPING_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let err = IdMappingStore::load(&path).unwrap_err();
        assert!(matches!(err, EnvsyncError::Persistence(_)));
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail
        let path = temp_dir.path().join(MAPPING_FILE_NAME);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "").unwrap();

        let mut store = IdMappingStore::new(&path);
        assert!(store.add_mapping("group", "g1", "newG1").is_err());
        assert_eq!(store.get_new_id("group", "g1"), Some("newG1"));
    }

    #[test]
    fn test_counts() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = IdMappingStore::new(temp_dir.path().join(MAPPING_FILE_NAME));
        store.add_mapping("user", "u1", "n1").unwrap();
        store.add_mapping("group", "g1", "n2").unwrap();
        store.add_mapping("group", "g2", "n3").unwrap();

        assert_eq!(store.counts(), vec![("group", 2), ("user", 1)]);
        assert_eq!(store.len(), 3);
    }
}
