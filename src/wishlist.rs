//! Wishlisted product ids, persisted through an injected key/value store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::Error;

/// Storage key holding the JSON array of wishlisted ids.
pub const WISHLIST_KEY: &str = "evol_wishlist";

/// Synchronous string key/value store.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Storage(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Writes a temp file and renames it over the old value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Storage(format!("Failed to create {}: {e}", self.dir.display()))
        })?;

        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                Error::Storage(format!("Failed to write {}: {e}", path.display()))
            })
    }
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let items = self
            .items
            .lock()
            .map_err(|_| Error::Storage("memory storage poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| Error::Storage("memory storage poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Set of product ids, re-persisted in full on every mutation.
pub struct Wishlist<S: LocalStorage> {
    storage: S,
    ids: Vec<String>,
    changes: watch::Sender<Vec<String>>,
}

impl<S: LocalStorage> Wishlist<S> {
    /// Read the persisted list. Unreadable JSON starts an empty list.
    pub fn load(storage: S) -> Result<Self, Error> {
        let ids = match storage.get_item(WISHLIST_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable wishlist");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let (changes, _) = watch::channel(ids.clone());
        Ok(Self {
            storage,
            ids,
            changes,
        })
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add `id`; returns false if it was already present.
    pub fn add(&mut self, id: &str) -> Result<bool, Error> {
        if self.has(id) {
            return Ok(false);
        }
        self.ids.push(id.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Remove `id`; returns false if it was absent.
    pub fn remove(&mut self, id: &str) -> Result<bool, Error> {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        if self.ids.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip membership of `id`; returns the new membership.
    pub fn toggle(&mut self, id: &str) -> Result<bool, Error> {
        if self.has(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    /// Receiver notified with the full id list after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.changes.subscribe()
    }

    fn persist(&self) -> Result<(), Error> {
        let json = serde_json::to_string(&self.ids)?;
        self.storage.set_item(WISHLIST_KEY, &json)?;
        debug!(count = self.ids.len(), "wishlist saved");
        self.changes.send_replace(self.ids.clone());
        Ok(())
    }
}
