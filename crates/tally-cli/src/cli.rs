//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Plan a monthly budget and ask the assistant about it
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal budget planner with a built-in budget assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to $TALLY_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show totals, the expense breakdown and savings progress
    Show,

    /// Set income or one expense category
    Set {
        /// Field: income, rent, food, transportation, utilities, entertainment, others
        field: String,

        /// Amount (non-numeric characters are stripped)
        value: String,
    },

    /// Set the savings target
    Target {
        /// Amount to save
        value: String,
    },

    /// Switch between light and dark theme
    Theme,

    /// Clear income, expenses and savings target
    Reset,

    /// Analyze expenses against the recommended allocation
    Analyze,

    /// Ask the budget assistant a single question
    Ask {
        /// Question text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Chat with the budget assistant interactively
    Chat,

    /// Show recent chat history
    History {
        /// Maximum number of messages
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}
