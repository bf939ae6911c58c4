//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (data dir resolution, open_session, field parsing)
//! - `budget` - Budget commands (show, set, target, theme, reset, analyze)
//! - `chat` - Assistant commands (ask, chat, history)

pub mod budget;
pub mod chat;
pub mod common;

// Re-export command functions for main.rs
pub use budget::*;
pub use chat::*;
pub use common::*;
