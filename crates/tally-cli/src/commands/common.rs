//! Shared command utilities
//!
//! This module contains:
//! - `resolve_data_dir` - Pick the data directory from the flag or defaults
//! - `open_session` - Load settings, responses and the snapshot file
//! - `start_session` / `start_chat_session` - Load the snapshot for one-shot or live use
//! - `Field` - Parse the `set` command's field name

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tally_core::config::default_data_dir;
use tally_core::random::ThreadRandom;
use tally_core::{Category, FileStore, KnowledgeBase, Session, Settings};
use tracing::debug;

use crate::presenter::TerminalPresenter;

pub type CliSession = Session<FileStore, ThreadRandom, TerminalPresenter>;

/// Use `--data-dir` when given, else the platform default
pub fn resolve_data_dir(data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_data_dir().context("Could not determine a data directory; pass --data-dir"),
    }
}

/// Open the session stored in the data directory
///
/// Settings and responses overrides are read from `<data_dir>/config/`.
/// The session is not started yet; see [`start_session`].
pub fn open_session(data_dir: Option<&Path>) -> Result<CliSession> {
    let dir = resolve_data_dir(data_dir)?;
    let config_dir = dir.join("config");

    let settings = Settings::load_from(&config_dir.join("settings.toml"))
        .context("Failed to load settings")?;
    let knowledge = KnowledgeBase::load_from(&config_dir.join("responses.toml"))
        .context("Failed to load chat responses")?;
    if knowledge.is_override() {
        debug!("Using custom chat responses");
    }

    let store_path = dir.join(&settings.storage.file_name);
    let store = FileStore::open(&store_path)
        .with_context(|| format!("Failed to open data file {}", store_path.display()))?;
    debug!("Using data file {}", store_path.display());

    Ok(Session::new(
        settings,
        knowledge,
        store,
        ThreadRandom,
        TerminalPresenter::muted(),
    ))
}

/// Load the snapshot without printing it, then unmute the presenter
pub fn start_session(session: &mut CliSession) -> Option<Duration> {
    let welcome = session.start();
    session.presenter_mut().unmute();
    welcome
}

/// Load the snapshot with the restored transcript on screen
///
/// Replayed lines show both sides; live input is not echoed afterwards
/// since the terminal already shows what the user typed.
pub fn start_chat_session(session: &mut CliSession) -> Option<Duration> {
    session.presenter_mut().unmute();
    let welcome = session.start();
    session.presenter_mut().interactive();
    welcome
}

/// Editable budget field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Income,
    Expense(Category),
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("income") {
            return Ok(Self::Income);
        }
        s.parse::<Category>().map(Self::Expense).map_err(|_| {
            format!(
                "Unknown field: {} (expected income, rent, food, transportation, utilities, entertainment or others)",
                s
            )
        })
    }
}
