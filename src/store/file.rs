//! File-backed credential store
//!
//! Keeps all keys in one JSON object on disk. Every write replaces the file
//! through a temporary sibling and a rename, so a crash mid-write leaves the
//! previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::CredentialStore;
use crate::error::{PortalError, Result};

/// Credential store persisted as a JSON file
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store at the given path (the file is created on first write)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the credentials file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PortalError::Storage(format!("Failed to read '{}': {}", self.path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A damaged file is treated as empty; the next write repairs it.
                tracing::warn!(
                    "Credentials file '{}' is not valid JSON, ignoring: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    PortalError::Storage(format!("Failed to create '{}': {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| PortalError::Storage(format!("Failed to serialize credentials: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| {
            PortalError::Storage(format!("Failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            PortalError::Storage(format!("Failed to replace '{}': {}", self.path.display(), e))
        })
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PortalError::Storage("credential store lock poisoned".to_string()))?;
        let mut entries = self.read_entries()?;
        if f(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        assert!(store.get("token").unwrap().is_none());
        store.remove("token").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::new(&path);
        store.set("token", "abc").unwrap();
        store.set("user", "{\"id\":\"1\"}").unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.get("token").unwrap(), Some("abc".to_string()));
        assert_eq!(reopened.get("user").unwrap(), Some("{\"id\":\"1\"}".to_string()));

        reopened.remove("token").unwrap();
        assert!(store.get("token").unwrap().is_none());
        assert!(store.get("user").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_is_repaired() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.get("token").unwrap().is_none());

        store.set("token", "fresh").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("fresh".to_string()));
    }
}
