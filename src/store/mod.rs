/// Local session store: durable key-value storage for the client.
///
/// Holds three independent string entries under well-known keys:
///
/// | Key                | Content                          |
/// |--------------------|----------------------------------|
/// | `phishguard_token` | bearer token of the session      |
/// | `phishguard_user`  | username of the session          |
/// | `phishguard-theme` | `light` or `dark`                |
///
/// The session keys are always written and removed in a single call
/// ([`LocalStore::put_all`] / [`LocalStore::remove_all`]) so a crash can
/// never leave only one of them behind. The store performs no network I/O.
pub mod file;
pub mod theme;

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;

pub use file::FileStore;

/// Key of the session token entry.
pub const TOKEN_KEY: &str = "phishguard_token";

/// Key of the session username entry.
pub const USERNAME_KEY: &str = "phishguard_user";

/// Key of the theme preference entry.
pub const THEME_KEY: &str = "phishguard-theme";

/// Durable string key-value storage.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Write every pair in one operation.
    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove every key in one operation. Missing keys are not an error.
    fn remove_all(&self, keys: &[&str]) -> Result<()>;

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.put_all(&[(key, value)])
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Non-durable store, for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given entries.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
