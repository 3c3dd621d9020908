use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Fields, PersistenceError, WizardDefinition};

/// Current layout of [`SavedProgress`]. Snapshots without a version field are
/// version 0 and share the same layout.
pub const PROGRESS_VERSION: u32 = 1;

/// String key-value storage that survives restarts of the front-end.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Process-local store, used by tests and as a fallback.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All keys of a [`FileStore`] live in one JSON object on disk.
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

    fn read_all(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // A corrupt file is replaced; any other read failure must not be.
        let mut entries = match self.read_all() {
            Err(PersistenceError::Malformed(err)) => {
                tracing::warn!(path = %self.path.display(), error = %err, "replacing corrupt store file");
                BTreeMap::new()
            }
            other => other?,
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// The persisted form of an in-progress wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    #[serde(default)]
    pub version: u32,
    pub fields: Fields,
    pub current_step_index: usize,
}

impl SavedProgress {
    pub fn new(fields: Fields, current_step_index: usize) -> Self {
        Self { version: PROGRESS_VERSION, fields, current_step_index }
    }

    pub fn encode(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and checks a snapshot against `definition`: the step must be a
    /// data-entry step and every saved field must match its declared kind.
    pub fn decode(definition: &WizardDefinition, raw: &str) -> Result<Self, PersistenceError> {
        let saved: SavedProgress = serde_json::from_str(raw)?;
        if saved.version > PROGRESS_VERSION {
            return Err(PersistenceError::UnsupportedVersion(saved.version));
        }
        let total = definition.total_steps();
        if saved.current_step_index < 1 || saved.current_step_index > total {
            return Err(PersistenceError::StepOutOfRange { step: saved.current_step_index, total });
        }
        Ok(Self {
            version: PROGRESS_VERSION,
            fields: Fields::reconcile(definition, saved.fields)?,
            current_step_index: saved.current_step_index,
        })
    }
}

/// Reads a definition's saved progress. A missing entry is `Ok(None)`.
pub fn load_progress(
    store: &dyn PersistenceStore,
    definition: &WizardDefinition,
) -> Result<Option<SavedProgress>, PersistenceError> {
    match store.get(definition.storage_key)? {
        Some(raw) => SavedProgress::decode(definition, &raw).map(Some),
        None => Ok(None),
    }
}

pub fn save_progress(
    store: &mut dyn PersistenceStore,
    definition: &WizardDefinition,
    progress: &SavedProgress,
) -> Result<(), PersistenceError> {
    store.set(definition.storage_key, &progress.encode()?)
}
