//! A small key-value store that keeps the text being edited between sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// The slot that holds the text of the notebook.
pub const SOURCE_SLOT: &str = "mathpro-src";

/// The directory, relative to the root of a notebook, where the store lives.
pub const STORE_DIR: &str = ".mathpro";

/// Named strings persisted in a TOML file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl Store {
    /// Opens the store of the notebook whose root is `root`.
    ///
    /// A store that was never saved is empty.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Store> {
        let path = root.as_ref().join(STORE_DIR).join("state.toml");

        let slots = if path.is_file() {
            toml::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };

        Ok(Store { path, slots })
    }

    /// Returns the content of a slot.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Writes a slot and saves the store.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.get(key) == Some(value) {
            return Ok(());
        }

        self.slots.insert(key.to_owned(), value.to_owned());
        self.save()
    }

    /// Writes the store on the disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&self.slots)?)?;
        trace!("saved {} slots to {}", self.slots.len(), self.path.display());
        Ok(())
    }

    /// Returns where the store is saved.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
