use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, TrainerError};

/// A string-keyed slot store for small JSON records.
pub trait ScoreStore {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Overwrite the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// `~/.intervals`, next to the default configuration file.
    pub fn default_location() -> Result<Self> {
        let directory = dirs::home_dir()
            .ok_or(TrainerError::NoDataDir)?
            .join(".intervals");
        Ok(Self::new(directory))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl ScoreStore for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    // Blocking write on the caller's thread. The scores file is a few hundred
    // bytes; move this to spawn_blocking if larger values are stored.
    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.slots.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl ScoreStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.slots.lock().get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().join("nested"));

        assert_eq!(store.read("scores"), None);
        store.write("scores", "{\"a\":1}").unwrap();
        assert_eq!(store.read("scores").as_deref(), Some("{\"a\":1}"));
        assert!(store.path_for("scores").ends_with("nested/scores.json"));
    }

    #[test]
    fn test_file_store_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().to_path_buf());

        store.write("scores", "first").unwrap();
        store.write("scores", "second").unwrap();
        assert_eq!(store.read("scores").as_deref(), Some("second"));
    }

    #[test]
    fn test_memory_store_clones_share_slots() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.write("scores", "value").unwrap();
        assert_eq!(store.read("scores").as_deref(), Some("value"));
        assert_eq!(store.read("other"), None);
    }
}
