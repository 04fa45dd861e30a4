//! # Filesystem-backed key-value store
//!
//! [`FileStore`] keeps one small file per key so desktop runs remember the theme
//! and the signed-in account across restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! └── <key>          # raw value, UTF-8
//! ```
//!
//! Use `dirs::data_dir()` joined with the app name to obtain a platform-appropriate base.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{KeyValueStore, StoreError};

/// Filesystem-backed KeyValueStore for native builds.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.base.join(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("carrental_store_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let store = FileStore::new(dir.clone());
        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark").unwrap();

        // Re-open from same directory
        let reopened = FileStore::new(dir.clone());
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));

        reopened.remove("theme").unwrap();
        reopened.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);

        // Cleanup
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_keys_are_sanitised() {
        let store = FileStore::new(PathBuf::from("/tmp/base"));
        assert_eq!(store.entry_path("session/refresh"), PathBuf::from("/tmp/base/session_refresh"));
    }
}
