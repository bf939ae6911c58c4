//! Settings for limits, persistence and chat pacing
//!
//! Settings are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/settings.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Override files may be partial; any key left out keeps its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::MAX_AMOUNT;

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../../../config/settings.toml");

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Chat pacing and transcript limits
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Messages kept in the persisted transcript
    pub history_cap: usize,
    /// Messages replayed when a session starts
    pub rendered_history: usize,
    /// Follow-up probability, in percent
    pub follow_up_chance: u32,
    pub thinking_delay: Duration,
    /// Upper bound (exclusive) of random extra thinking time
    pub thinking_jitter: Duration,
    pub follow_up_lead: Duration,
    pub welcome_delay: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_cap: 50,
            rendered_history: 10,
            follow_up_chance: 30,
            thinking_delay: Duration::from_millis(1000),
            thinking_jitter: Duration::from_millis(1000),
            follow_up_lead: Duration::from_millis(1000),
            welcome_delay: Duration::from_millis(500),
        }
    }
}

/// Where and how the snapshot is stored
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    /// Prefix for every persisted key
    pub namespace: String,
    /// Snapshot file name inside the data directory
    pub file_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: "budgetPlanner_".to_string(),
            file_name: "state.json".to_string(),
        }
    }
}

/// All runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Largest amount any budget field may hold
    pub max_amount: f64,
    pub storage: StorageSettings,
    pub chat: ChatSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_amount: MAX_AMOUNT,
            storage: StorageSettings::default(),
            chat: ChatSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the default override location, else embedded defaults
    pub fn load() -> Result<Self> {
        load_settings(None)
    }

    /// Load settings from an explicit override file
    ///
    /// A missing file falls back to the embedded defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        load_settings(Some(path))
    }

    /// Parse settings from TOML content layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_settings(content)
    }
}

/// Base data directory (`$TALLY_DATA_DIR` or ~/.local/share/tally)
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::data_local_dir().map(|d| d.join("tally"))
}

/// Default settings override path
pub fn default_config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config").join("settings.toml"))
}

/// Load settings (override first, then default)
fn load_settings(override_path: Option<&Path>) -> Result<Settings> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    match path {
        Some(path) if path.exists() => {
            debug!("Loading settings override from {}", path.display());
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read settings: {}", e)))?;
            parse_settings(&content)
        }
        _ => parse_settings(DEFAULT_SETTINGS),
    }
}

/// Raw settings structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    limits: Option<RawLimits>,
    storage: Option<RawStorage>,
    chat: Option<RawChat>,
}

#[derive(Debug, Deserialize)]
struct RawLimits {
    max_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    namespace: Option<String>,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    history_cap: Option<usize>,
    rendered_history: Option<usize>,
    follow_up_chance: Option<u32>,
    thinking_delay_ms: Option<u64>,
    thinking_jitter_ms: Option<u64>,
    follow_up_lead_ms: Option<u64>,
    welcome_delay_ms: Option<u64>,
}

fn parse_settings(content: &str) -> Result<Settings> {
    let raw: RawSettings = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(limits) = raw.limits {
        if let Some(max) = limits.max_amount {
            if !max.is_finite() || max <= 0.0 {
                return Err(Error::Config(format!(
                    "max_amount must be positive, got {}",
                    max
                )));
            }
            settings.max_amount = max;
        }
    }

    if let Some(storage) = raw.storage {
        if let Some(namespace) = storage.namespace {
            settings.storage.namespace = namespace;
        }
        if let Some(file_name) = storage.file_name {
            if file_name.trim().is_empty() {
                return Err(Error::Config("storage.file_name is empty".to_string()));
            }
            settings.storage.file_name = file_name;
        }
    }

    if let Some(chat) = raw.chat {
        let c = &mut settings.chat;
        if let Some(cap) = chat.history_cap {
            c.history_cap = cap;
        }
        if let Some(rendered) = chat.rendered_history {
            c.rendered_history = rendered;
        }
        if let Some(chance) = chat.follow_up_chance {
            if chance > 100 {
                return Err(Error::Config(format!(
                    "follow_up_chance is a percentage, got {}",
                    chance
                )));
            }
            c.follow_up_chance = chance;
        }
        if let Some(ms) = chat.thinking_delay_ms {
            c.thinking_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = chat.thinking_jitter_ms {
            c.thinking_jitter = Duration::from_millis(ms);
        }
        if let Some(ms) = chat.follow_up_lead_ms {
            c.follow_up_lead = Duration::from_millis(ms);
        }
        if let Some(ms) = chat.welcome_delay_ms {
            c.welcome_delay = Duration::from_millis(ms);
        }
    }

    if settings.chat.rendered_history > settings.chat.history_cap {
        settings.chat.rendered_history = settings.chat.history_cap;
    }

    Ok(settings)
}
