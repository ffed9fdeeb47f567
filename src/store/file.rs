/// File-backed [`LocalStore`]: a flat JSON object on disk.
///
/// Default location is `<data dir>/session.json`. Each write rewrites the
/// whole object through a temporary file and a rename, so readers see
/// either the old or the new content. A missing or malformed file reads as
/// empty; the next write replaces it.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::LocalStore;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(map).context("failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map();
        apply(&mut map);
        self.write_map(&map)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        self.read_map().remove(key)
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}
