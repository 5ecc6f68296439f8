//! Credential store
//!
//! Holds the session token and the last-known user record so a session
//! survives a restart. Values live under two fixed keys, [`TOKEN_KEY`] and
//! [`USER_KEY`], and are readable synchronously at process start.
//!
//! Two drivers are provided:
//! - File store - default, a small JSON document on disk
//! - Memory store - for tests and embedding
//!
//! The session manager is the only writer. Everything else reads the
//! session through it.

pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::config::{CredentialsConfig, StoreDriver};
use crate::error::Result;
use crate::models::{StoredCredentials, User};

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the serialized user record
pub const USER_KEY: &str = "user";

/// Key/value storage for credentials
pub trait CredentialStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value (no error if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read the stored token and user record.
///
/// An unreadable user record is dropped rather than failing the whole load;
/// the token alone is enough to restore a session.
pub fn load_credentials(store: &dyn CredentialStore) -> Result<Option<StoredCredentials>> {
    let Some(token) = store.get(TOKEN_KEY)? else {
        return Ok(None);
    };
    if token.trim().is_empty() {
        return Ok(None);
    }

    let user = match store.get(USER_KEY)? {
        Some(raw) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached user record: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(Some(StoredCredentials { token, user }))
}

/// Persist a token and user record
pub fn save_credentials(store: &dyn CredentialStore, credentials: &StoredCredentials) -> Result<()> {
    store.set(TOKEN_KEY, &credentials.token)?;
    match &credentials.user {
        Some(user) => {
            let raw = serde_json::to_string(user)
                .map_err(|e| anyhow::anyhow!("Failed to serialize user record: {}", e))?;
            store.set(USER_KEY, &raw)
        }
        None => store.remove(USER_KEY),
    }
}

/// Remove both keys
pub fn clear_credentials(store: &dyn CredentialStore) -> Result<()> {
    store.remove(TOKEN_KEY)?;
    store.remove(USER_KEY)
}

/// Create a credential store based on configuration
pub fn create_store(config: &CredentialsConfig) -> Arc<dyn CredentialStore> {
    match config.driver {
        StoreDriver::File => Arc::new(FileCredentialStore::new(&config.path)),
        StoreDriver::Memory => Arc::new(MemoryCredentialStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, Role};

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            role: Role::Tpo,
            status: AccountStatus::Active,
            assigned_drives: vec![],
        }
    }

    #[test]
    fn test_save_load_clear() {
        let store = MemoryCredentialStore::new();
        assert!(load_credentials(&store).unwrap().is_none());

        let creds = StoredCredentials {
            token: "tok".to_string(),
            user: Some(user()),
        };
        save_credentials(&store, &creds).unwrap();
        assert_eq!(load_credentials(&store).unwrap(), Some(creds));

        clear_credentials(&store).unwrap();
        assert!(load_credentials(&store).unwrap().is_none());
        assert!(store.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_user_record_keeps_token() {
        let store = MemoryCredentialStore::new();
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();

        let creds = load_credentials(&store).unwrap().unwrap();
        assert_eq!(creds.token, "tok");
        assert!(creds.user.is_none());
    }

    #[test]
    fn test_blank_token_is_no_credentials() {
        let store = MemoryCredentialStore::new();
        store.set(TOKEN_KEY, "   ").unwrap();
        assert!(load_credentials(&store).unwrap().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = MemoryCredentialStore::new();
        clear_credentials(&store).unwrap();
        clear_credentials(&store).unwrap();
        assert!(load_credentials(&store).unwrap().is_none());
    }

    #[test]
    fn test_create_memory_store() {
        let config = CredentialsConfig {
            driver: StoreDriver::Memory,
            ..CredentialsConfig::default()
        };
        let store = create_store(&config);
        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), Some("abc".to_string()));
    }
}
