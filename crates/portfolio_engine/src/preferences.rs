use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use page_logging::{page_info, page_warn};

use crate::persist::{AtomicFileWriter, PersistError};

/// Browser-local-storage style key/value preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a RON map on disk, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct RonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl RonPreferenceStore {
    /// Opens the store. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for RonPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value.to_string());
        let content = ron::ser::to_string_pretty(&next, ron::ser::PrettyConfig::new())
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        AtomicFileWriter::new(self.path.clone()).write(&content)?;
        self.values = next;
        Ok(())
    }
}

fn load_values(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            page_warn!("Failed to read preferences from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };
    match ron::from_str(&content) {
        Ok(values) => {
            page_info!("Loaded preferences from {:?}", path);
            values
        }
        Err(err) => {
            page_warn!("Failed to parse preferences from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}
