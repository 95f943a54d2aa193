use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Keychain service name
const SERVICE_NAME: &str = "hackmatch";

/// Fixed key for the access half
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";

/// Fixed key for the refresh half
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";

/// The stored session: both halves of the bearer credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "ACCESS_TOKEN", default)]
    pub access: Option<String>,
    #[serde(rename = "REFRESH_TOKEN", default)]
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }

    /// Both halves present and non-empty
    pub fn is_complete(&self) -> bool {
        self.halves().is_some()
    }

    pub fn halves(&self) -> Option<(&str, &str)> {
        match (self.access.as_deref(), self.refresh.as_deref()) {
            (Some(a), Some(r)) if !a.is_empty() && !r.is_empty() => Some((a, r)),
            _ => None,
        }
    }
}

/// Persisted access/refresh token storage.
///
/// Operations are total: backing-store failures are logged and a failed read
/// behaves like an empty store.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> TokenPair;
    fn set(&self, access: &str, refresh: &str);
    fn set_access(&self, access: &str);
    fn clear(&self);
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON file store. Every `get` re-reads the file so other running clients
/// see each other's writes. Last writer wins.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<TokenPair> {
        if !self.path.exists() {
            return Ok(TokenPair::default());
        }
        let contents = std::fs::read_to_string(&self.path).context("Failed to read token file")?;
        let pair = serde_json::from_str(&contents).context("Failed to parse token file")?;
        Ok(pair)
    }

    fn save(&self, pair: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let contents = serde_json::to_string_pretty(pair)?;

        // Write then rename so a concurrent reader never sees a partial file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write token file")?;
        restrict_permissions(&tmp);
        std::fs::rename(&tmp, &self.path).context("Failed to replace token file")?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(error = %e, "Failed to restrict token file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

impl TokenStore for FileTokenStore {
    fn get(&self) -> TokenPair {
        match self.load() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, path = ?self.path, "Treating unreadable token file as empty");
                TokenPair::default()
            }
        }
    }

    fn set(&self, access: &str, refresh: &str) {
        if let Err(e) = self.save(&TokenPair::new(access, refresh)) {
            warn!(error = %e, "Failed to persist tokens");
        }
    }

    fn set_access(&self, access: &str) {
        let mut pair = self.get();
        pair.access = Some(access.to_string());
        if let Err(e) = self.save(&pair) {
            warn!(error = %e, "Failed to persist access token");
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(error = %e, "Failed to remove token file");
            }
        }
        debug!("Token file cleared");
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

/// Stores each half as its own keychain entry under the `hackmatch` service.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }

    fn read(key: &str) -> Option<String> {
        let entry = match Self::entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, key, "Keyring unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, key, "Failed to read token from keychain");
                None
            }
        }
    }

    fn write(key: &str, value: &str) {
        let result = Self::entry(key).and_then(|entry| {
            entry
                .set_password(value)
                .context("Failed to store token in keychain")
        });
        if let Err(e) = result {
            warn!(error = %e, key, "Failed to persist token");
        }
    }

    fn delete(key: &str) {
        let result = Self::entry(key).and_then(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        });
        if let Err(e) = result {
            warn!(error = %e, key, "Failed to clear token");
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> TokenPair {
        TokenPair {
            access: Self::read(ACCESS_TOKEN),
            refresh: Self::read(REFRESH_TOKEN),
        }
    }

    fn set(&self, access: &str, refresh: &str) {
        Self::write(ACCESS_TOKEN, access);
        Self::write(REFRESH_TOKEN, refresh);
    }

    fn set_access(&self, access: &str) {
        Self::write(ACCESS_TOKEN, access);
    }

    fn clear(&self) {
        Self::delete(ACCESS_TOKEN);
        Self::delete(REFRESH_TOKEN);
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<TokenPair>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            inner: Mutex::new(TokenPair::new(access, refresh)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenPair> {
        // A poisoned lock still holds a usable pair
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> TokenPair {
        self.lock().clone()
    }

    fn set(&self, access: &str, refresh: &str) {
        *self.lock() = TokenPair::new(access, refresh);
    }

    fn set_access(&self, access: &str) {
        self.lock().access = Some(access.to_string());
    }

    fn clear(&self) {
        *self.lock() = TokenPair::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_completeness() {
        assert!(!TokenPair::default().is_complete());
        assert!(TokenPair::new("a", "r").is_complete());
        assert!(!TokenPair::new("", "r").is_complete());
        assert!(!TokenPair {
            access: Some("a".into()),
            refresh: None
        }
        .is_complete());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), TokenPair::default());

        store.set("a1", "r1");
        assert_eq!(store.get(), TokenPair::new("a1", "r1"));

        store.set_access("a2");
        assert_eq!(store.get(), TokenPair::new("a2", "r1"));

        store.clear();
        assert_eq!(store.get(), TokenPair::default());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.get(), TokenPair::default());

        store.set("a1", "r1");
        assert_eq!(store.get(), TokenPair::new("a1", "r1"));

        store.set("a2", "r2");
        assert_eq!(store.get(), TokenPair::new("a2", "r2"));

        store.clear();
        assert_eq!(store.get(), TokenPair::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_shared_between_instances() {
        let dir = tempfile::tempdir().expect("temp dir");
        let writer = FileTokenStore::new(dir.path());
        let reader = FileTokenStore::new(dir.path());

        writer.set("a1", "r1");
        assert_eq!(reader.get(), TokenPair::new("a1", "r1"));

        reader.set_access("a2");
        assert_eq!(writer.get(), TokenPair::new("a2", "r1"));
    }

    #[test]
    fn test_file_store_uses_fixed_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::new(dir.path());
        store.set("a1", "r1");

        let raw = std::fs::read_to_string(store.path()).expect("token file written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value[ACCESS_TOKEN], "a1");
        assert_eq!(value[REFRESH_TOKEN], "r1");
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "{not json").expect("write corrupt file");

        assert_eq!(store.get(), TokenPair::default());

        store.set("a", "r");
        assert_eq!(store.get(), TokenPair::new("a", "r"));
    }
}
