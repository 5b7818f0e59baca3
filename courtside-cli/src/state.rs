//! Key-value store persisted as a single JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use courtside_core::{KeyValueStore, StoreError};
use tracing::debug;

type Entries = BTreeMap<String, String>;

/// Store that rewrites its backing file after every change.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file starts empty.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Entries::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Entries::new(),
            Err(err) => return Err(backend(&path, &err)),
        };
        debug!("Opened state file {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn entries(&self) -> Result<MutexGuard<'_, Entries>, StoreError> {
        self.entries
            .lock()
            .map_err(|_poisoned| StoreError::Backend("state file lock poisoned".into()))
    }

    fn flush(&self, entries: &Entries) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, encoded).map_err(|err| backend(&self.path, &err))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

fn backend(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {err}", path.display()))
}
