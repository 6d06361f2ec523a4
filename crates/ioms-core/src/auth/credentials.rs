use keyring::Entry;

use super::storage::{Storage, StorageError};

const SERVICE_NAME: &str = "ioms";

/// Session storage in the OS keychain, one entry per key.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// Without `native-keyring` the keyring crate runs on its in-process mock store,
// which is safe to exercise from tests.
#[cfg(all(test, not(feature = "native-keyring")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_reads_as_none() {
        let storage = KeyringStorage::with_service("ioms-test");
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_entry_is_ok() {
        let storage = KeyringStorage::with_service("ioms-test");
        assert!(storage.remove("tokenExpiry").is_ok());
    }

    #[test]
    fn test_set_accepts_value() {
        let storage = KeyringStorage::default();
        assert!(storage.set("token", "tok123").is_ok());
    }
}
