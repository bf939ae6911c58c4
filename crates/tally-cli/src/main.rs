//! Tally CLI - Budget planner and assistant
//!
//! Usage:
//!   tally set income 4000     Set monthly income
//!   tally set rent 1600       Set an expense category
//!   tally target 1200         Set a savings target
//!   tally show                Show totals and breakdown
//!   tally chat                Talk to the budget assistant

mod cli;
mod commands;
mod presenter;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Commands::Show => commands::cmd_show(data_dir),
        Commands::Set { field, value } => commands::cmd_set(data_dir, &field, &value),
        Commands::Target { value } => commands::cmd_target(data_dir, &value),
        Commands::Theme => commands::cmd_theme(data_dir),
        Commands::Reset => commands::cmd_reset(data_dir),
        Commands::Analyze => commands::cmd_analyze(data_dir),
        Commands::Ask { text } => commands::cmd_ask(data_dir, &text.join(" ")),
        Commands::Chat => commands::cmd_chat(data_dir).await,
        Commands::History { limit } => commands::cmd_history(data_dir, limit),
    }
}
