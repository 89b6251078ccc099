use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    errors::TripError,
    utils::{
        paths,
        persistence::{load_json, save_json},
    },
};

use super::{KeyValueStore, Result};

const CORRUPT_SUFFIX: &str = "corrupt";

/// Filesystem-backed key-value store keeping every key in a single JSON object.
///
/// Writes go through a temp file and rename, so a failed write leaves the
/// previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Opens `store.json` inside the given data directory.
    pub fn in_dir(base: &Path) -> Result<Self> {
        Self::new(paths::store_file_in(base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        load_json(&self.path)
    }

    /// Reads the document for a write. An unreadable document is moved aside
    /// instead of being overwritten.
    fn read_entries_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(TripError::Serde(err)) => {
                let quarantine = self.quarantine_path();
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %quarantine.display(),
                    error = %err,
                    "store document unreadable; starting a fresh one"
                );
                fs::rename(&self.path, &quarantine)?;
                Ok(BTreeMap::new())
            }
            Err(other) => Err(other),
        }
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        let ext = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(existing) => format!("{}.{}", existing, CORRUPT_SUFFIX),
            None => CORRUPT_SUFFIX.to_string(),
        };
        path.set_extension(ext);
        path
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| TripError::Storage("store lock poisoned".into()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        save_json(&entries, &self.path)?;
        tracing::debug!(key, bytes = value.len(), "store key written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries_for_update()?;
        if entries.remove(key).is_some() {
            save_json(&entries, &self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_reopening() {
        let dir = tempdir().unwrap();
        {
            let store = JsonFileStore::in_dir(dir.path()).unwrap();
            store.set("alpha", "[1,2]").unwrap();
            store.set("beta", "{}").unwrap();
            store.remove("beta").unwrap();
        }
        let reopened = JsonFileStore::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.get("alpha").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("beta").unwrap(), None);
    }

    #[test]
    fn corrupt_document_is_moved_aside_on_write() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path()).unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert!(store.get("alpha").is_err());
        store.set("alpha", "[]").unwrap();

        assert_eq!(store.get("alpha").unwrap().as_deref(), Some("[]"));
        let quarantined = fs::read_to_string(store.quarantine_path()).unwrap();
        assert_eq!(quarantined, "not json");
    }
}
