//! Persistence of budget inputs, theme and chat transcript
//!
//! Every logical field lives under its own namespaced key in a flat
//! key-value backend. Fields are read independently: a corrupt blob resets
//! only that field to its default and logs a warning, the rest of the
//! snapshot still loads.
//!
//! Backends:
//! - [`MemoryStore`] - in-process map (tests, throwaway sessions)
//! - [`FileStore`] - one JSON object on disk, replaced atomically on write

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::StorageSettings;
use crate::error::{Error, Result};
use crate::models::{ChatMessage, ExpenseFields, Theme};

/// A flat string key-value backend
pub trait KeyValueStore {
    /// Backend name (for logging)
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entries, for inspection in tests
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File backend: a single JSON object of key → string
///
/// The whole file is rewritten on every change through a temp file in the
/// same directory, so a crash never leaves a half-written snapshot.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or create) the store at `path`
    ///
    /// Creates the parent directory if it doesn't exist. An unreadable or
    /// corrupt file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!(
                        "Failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("Created data directory: {}", parent.display());
            }
        }

        let entries = if path.exists() {
            let bytes = fs::read(&path).unwrap_or_else(|e| {
                warn!(
                    "Snapshot file {} is unreadable, starting empty: {}",
                    path.display(),
                    e
                );
                Vec::new()
            });
            match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(_) if bytes.is_empty() => BTreeMap::new(),
                Err(e) => {
                    warn!(
                        "Snapshot file {} is corrupt, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened file store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let json = serde_json::to_string_pretty(&self.entries)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| {
            Error::Storage(format!(
                "Failed to write snapshot {}: {}",
                self.path.display(),
                e.error
            ))
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Everything that survives a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// Raw income field
    pub income: String,
    /// Raw expense fields
    pub expenses: ExpenseFields,
    /// Raw savings target field
    pub savings_target: String,
    pub theme: Theme,
    /// Oldest first
    pub chat_history: Vec<ChatMessage>,
}

/// Namespaced key names for each persisted field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub income: String,
    pub expenses: String,
    pub savings_target: String,
    pub theme: String,
    pub chat_history: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            income: format!("{}income", namespace),
            expenses: format!("{}expenses", namespace),
            savings_target: format!("{}savingsTarget", namespace),
            theme: format!("{}theme", namespace),
            chat_history: format!("{}chatHistory", namespace),
        }
    }

    fn all(&self) -> [&str; 5] {
        [
            &self.income,
            &self.expenses,
            &self.savings_target,
            &self.theme,
            &self.chat_history,
        ]
    }
}

/// Snapshot store over a key-value backend
///
/// The only component that reads or writes the durable snapshot; it owns
/// the serialization format of each field.
pub struct BudgetStore<B: KeyValueStore> {
    backend: B,
    keys: StorageKeys,
    history_cap: usize,
}

impl<B: KeyValueStore> BudgetStore<B> {
    pub fn new(backend: B, settings: &StorageSettings, history_cap: usize) -> Self {
        Self {
            backend,
            keys: StorageKeys::new(&settings.namespace),
            history_cap,
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Write every field
    ///
    /// The transcript is cut to the most recent `history_cap` messages.
    /// Each key is written even if an earlier one failed; the first error
    /// is returned. Saving the same state twice is harmless.
    pub fn save(&mut self, state: &PersistedState) -> Result<()> {
        let expenses = serde_json::to_string(&state.expenses)?;
        let skip = state.chat_history.len().saturating_sub(self.history_cap);
        let history = serde_json::to_string(&state.chat_history[skip..])?;

        let writes = [
            (self.keys.income.clone(), state.income.as_str()),
            (self.keys.expenses.clone(), expenses.as_str()),
            (self.keys.savings_target.clone(), state.savings_target.as_str()),
            (self.keys.theme.clone(), state.theme.as_str()),
            (self.keys.chat_history.clone(), history.as_str()),
        ];

        let mut first_error = None;
        for (key, value) in writes {
            if let Err(e) = self.backend.set(&key, value) {
                warn!("Failed to save {} to {} store: {}", key, self.backend.name(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Read every field, resetting unreadable ones to their defaults
    pub fn load(&self) -> PersistedState {
        let income = self.read_field(&self.keys.income, |raw| Ok(raw.to_string()));
        let expenses = self.read_field(&self.keys.expenses, |raw| {
            serde_json::from_str::<ExpenseFields>(raw).map_err(|e| e.to_string())
        });
        let savings_target =
            self.read_field(&self.keys.savings_target, |raw| Ok(raw.to_string()));
        let theme = self.read_field(&self.keys.theme, |raw| raw.parse::<Theme>());
        let mut chat_history = self.read_field(&self.keys.chat_history, |raw| {
            serde_json::from_str::<Vec<ChatMessage>>(raw).map_err(|e| e.to_string())
        });

        let excess = chat_history.len().saturating_sub(self.history_cap);
        chat_history.drain(..excess);

        PersistedState {
            income,
            expenses,
            savings_target,
            theme,
            chat_history,
        }
    }

    /// Remove every persisted key
    pub fn clear(&mut self) -> Result<()> {
        for key in self.keys.all() {
            self.backend.remove(key)?;
        }
        Ok(())
    }

    fn read_field<T, F>(&self, key: &str, parse: F) -> T
    where
        T: Default,
        F: FnOnce(&str) -> std::result::Result<T, String>,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to read {} from {} store: {}", key, self.backend.name(), e);
                return T::default();
            }
        };

        match parse(&raw) {
            Ok(value) => value,
            Err(message) => {
                let err = Error::Parse {
                    key: key.to_string(),
                    message,
                };
                warn!("{}; using default", err);
                T::default()
            }
        }
    }
}
