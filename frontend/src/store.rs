//! Durable key-value store backed by a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lantern_core::persistence::{KeyValueStore, StoreError};

/// Every entry lives in one JSON object. The whole file is rewritten on each
/// `set`, through a temporary file so a crash never leaves it half written.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is created on the first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries: BTreeMap<String, String> = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| StoreError::Format(e.to_string()))?
        } else {
            BTreeMap::new()
        };
        log::debug!("save store {} ({} entries)", path.display(), entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = scratch("lantern_store_test_missing");
        let store = FileStore::open(&dir.join("saves.json")).unwrap();
        assert!(store.get("ZELDA").is_none());
        assert!(!dir.exists());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = scratch("lantern_store_test_reopen");
        let path = dir.join("nested").join("saves.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("ZELDA", "AAEC").unwrap();
        store.set("TETRIS", "").unwrap();
        store.set("ZELDA", "AQID").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("ZELDA").as_deref(), Some("AQID"));
        assert_eq!(reopened.get("TETRIS").as_deref(), Some(""));
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_file_is_format_error() {
        let dir = scratch("lantern_store_test_malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("saves.json");
        std::fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Format(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
