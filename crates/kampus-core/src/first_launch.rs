//! First-launch detection backed by a small key-value store.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Key of the persisted first-launch flag.
pub const FIRST_LAUNCH_KEY: &str = "first_launch";

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for tests and ephemeral shells.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a flat JSON object in a single file.
///
/// The file and its parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Returns `true` exactly once per install.
///
/// The flag counts as set when absent or truthy; reading it that way writes
/// `false` back. A failed read is treated as "not first launch".
pub fn detect_first_launch(store: &impl KeyValueStore) -> bool {
    let stored = match store.get(FIRST_LAUNCH_KEY) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!("Failed to read first-launch flag: {}", error);
            return false;
        }
    };

    let first_launch = stored.as_deref().map_or(true, is_truthy);
    if first_launch {
        if let Err(error) = store.set(FIRST_LAUNCH_KEY, "false") {
            tracing::warn!("Failed to persist first-launch flag: {}", error);
        }
        tracing::info!("First launch detected");
    }
    first_launch
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("unavailable".to_string()))
        }
    }

    #[test]
    fn first_launch_is_reported_once() {
        let store = MemoryStore::new();

        assert!(detect_first_launch(&store));
        assert_eq!(
            store.get(FIRST_LAUNCH_KEY).unwrap().as_deref(),
            Some("false")
        );
        assert_eq!(store.values.borrow().len(), 1);

        assert!(!detect_first_launch(&store));
        assert!(!detect_first_launch(&store));
    }

    #[test]
    fn explicit_true_flag_counts_as_first_launch() {
        let store = MemoryStore::new();
        store.set(FIRST_LAUNCH_KEY, " TRUE ").unwrap();

        assert!(detect_first_launch(&store));
        assert!(!detect_first_launch(&store));
    }

    #[test]
    fn unreadable_store_is_not_first_launch() {
        assert!(!detect_first_launch(&BrokenStore));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kampus-shell.json");

        assert!(detect_first_launch(&FileStore::new(&path)));
        assert!(path.exists());
        assert!(!detect_first_launch(&FileStore::new(&path)));
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("kampus-shell.json"));

        store.set("locale", "en").unwrap();
        store.set(FIRST_LAUNCH_KEY, "false").unwrap();

        assert_eq!(store.get("locale").unwrap().as_deref(), Some("en"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kampus-shell.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = FileStore::new(&path).get(FIRST_LAUNCH_KEY).unwrap_err();
        assert!(matches!(error, Error::Serialization(_)));
        assert!(!detect_first_launch(&FileStore::new(path)));
    }
}
