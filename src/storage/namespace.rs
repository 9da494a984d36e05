//! On-disk layout of a backup
//!
//! ```text
//! <root>/<resource>/<command>/<recordId>.json              independent + singleton
//! <root>/<resource>/<command>/<sourceId>/<recordId>.json   dependent
//! ```
//!
//! `<resource>` is the lowercased resource name. Identifiers are recovered
//! from file and directory names, so a directory listing yields the full
//! identifier set without reading any file contents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::Record;
use crate::error::{EnvsyncError, EnvsyncResult, ResolutionWarning};

use super::file_io::{list_json_stems, list_subdirectories, write_json_atomic};

/// A persisted record and the identifier its filename carries
#[derive(Debug, Clone)]
pub struct RecordFile {
    pub id: String,
    pub path: PathBuf,
}

/// Path namespace rooted at a backup directory
#[derive(Debug, Clone)]
pub struct PathNamespace {
    root: PathBuf,
}

impl PathNamespace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory
    pub fn ensure_root(&self) -> EnvsyncResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            EnvsyncError::Persistence(format!(
                "Failed to create backup directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// `<root>/<resource>/<command>`
    pub fn command_dir(&self, resource: &str, command: &str) -> PathBuf {
        self.root.join(resource.to_lowercase()).join(command)
    }

    /// `<root>/<resource>/<command>/<sourceId>`
    pub fn source_dir(&self, resource: &str, command: &str, source_id: &str) -> PathBuf {
        self.command_dir(resource, command).join(source_id)
    }

    /// Path of one record file
    pub fn record_path(
        &self,
        resource: &str,
        command: &str,
        source_id: Option<&str>,
        id: &str,
    ) -> PathBuf {
        let dir = match source_id {
            Some(source_id) => self.source_dir(resource, command, source_id),
            None => self.command_dir(resource, command),
        };
        dir.join(format!("{}.json", id))
    }

    /// Persist a record, overwriting any earlier copy
    pub fn write_record(
        &self,
        resource: &str,
        command: &str,
        source_id: Option<&str>,
        id: &str,
        record: &Record,
    ) -> EnvsyncResult<PathBuf> {
        let path = self.record_path(resource, command, source_id, id);
        write_json_atomic(&path, record)?;
        Ok(path)
    }

    /// Identifiers persisted directly under `<resource>/<command>`
    ///
    /// Returns `None` when the directory does not exist.
    pub fn record_ids(&self, resource: &str, command: &str) -> EnvsyncResult<Option<Vec<String>>> {
        let dir = self.command_dir(resource, command);
        if !dir.is_dir() {
            return Ok(None);
        }
        list_json_stems(&dir).map(Some)
    }

    /// Source identifiers persisted under a dependent `<resource>/<command>`
    pub fn source_ids(&self, resource: &str, command: &str) -> EnvsyncResult<Option<Vec<String>>> {
        let dir = self.command_dir(resource, command);
        if !dir.is_dir() {
            return Ok(None);
        }
        list_subdirectories(&dir).map(Some)
    }

    /// Record files in `dir`, in identifier order
    pub fn record_files(&self, dir: &Path) -> EnvsyncResult<Vec<RecordFile>> {
        Ok(list_json_stems(dir)?
            .into_iter()
            .map(|id| RecordFile {
                path: dir.join(format!("{}.json", id)),
                id,
            })
            .collect())
    }

    /// Read one persisted record
    pub fn read_record(&self, path: &Path) -> Result<Record, ResolutionWarning> {
        let malformed = |message: String| ResolutionWarning::MalformedRecord {
            path: path.display().to_string(),
            message,
        };

        let contents = fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(serde_json::Value::Object(record)) => Ok(record),
            Ok(_) => Err(malformed("expected a JSON object".to_string())),
            Err(e) => Err(malformed(e.to_string())),
        }
    }
}

/// Whether an identifier can be used as a file or directory name
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_layout_lowercases_resource() {
        let ns = PathNamespace::new("/backup");
        assert_eq!(
            ns.record_path("groupMembers", "listUsers", Some("g1"), "u1"),
            PathBuf::from("/backup/groupmembers/listUsers/g1/u1.json")
        );
        assert_eq!(
            ns.record_path("authorizationServer", "lists", None, "aus1"),
            PathBuf::from("/backup/authorizationserver/lists/aus1.json")
        );
    }

    #[test]
    fn test_write_then_list_ids() {
        let temp_dir = TempDir::new().unwrap();
        let ns = PathNamespace::new(temp_dir.path());

        ns.write_record("group", "lists", None, "g2", &record(json!({"id": "g2"})))
            .unwrap();
        ns.write_record("group", "lists", None, "g1", &record(json!({"id": "g1"})))
            .unwrap();

        let ids = ns.record_ids("group", "lists").unwrap().unwrap();
        assert_eq!(ids, vec!["g1", "g2"]);
    }

    #[test]
    fn test_missing_directory_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let ns = PathNamespace::new(temp_dir.path());

        assert!(ns.record_ids("group", "lists").unwrap().is_none());
        assert!(ns.source_ids("group", "listUsers").unwrap().is_none());
    }

    #[test]
    fn test_source_ids_from_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let ns = PathNamespace::new(temp_dir.path());

        ns.write_record("group", "listUsers", Some("g1"), "u1", &record(json!({"id": "u1"})))
            .unwrap();
        ns.write_record("group", "listUsers", Some("g2"), "u2", &record(json!({"id": "u2"})))
            .unwrap();

        let sources = ns.source_ids("group", "listUsers").unwrap().unwrap();
        assert_eq!(sources, vec!["g1", "g2"]);
    }

    #[test]
    fn test_read_record_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        let ns = PathNamespace::new(temp_dir.path());
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let warning = ns.read_record(&path).unwrap_err();
        assert!(matches!(warning, ResolutionWarning::MalformedRecord { .. }));
    }

    #[test]
    fn test_safe_identifier() {
        assert!(is_safe_identifier("00u1abcd"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier(".."));
        assert!(!is_safe_identifier("a/b"));
    }
}
