//! In-memory credential store
//!
//! Lives only as long as the process. Used by tests and by embedders that
//! keep their own persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use super::CredentialStore;
use crate::error::{PortalError, Result};

/// Credential store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> PortalError {
    PortalError::Storage("credential store lock poisoned".to_string())
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty());

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("abc".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("token").unwrap();
        assert!(store.get("token").unwrap().is_none());
        store.remove("token").unwrap();
    }
}
