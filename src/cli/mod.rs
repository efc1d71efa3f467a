//! CLI module for the semantic answer cache
//!
//! Provides subcommands:
//! - `serve`: HTTP API server
//! - `ask`: answer one question through the cache
//! - `stats`: show answer cache statistics
//! - `clear`: delete every cached answer

pub mod ask;
pub mod cache;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LogFormat, LoggingConfig};
use crate::infrastructure::logging;

/// Semantic answer cache - reuse answers to similar questions
#[derive(Debug, Parser)]
#[command(name = "qa-semantic-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer one question, consulting the cache first
    Ask(ask::AskArgs),

    /// Show answer cache statistics
    Stats,

    /// Delete every cached answer and re-provision the collection
    Clear(cache::ClearArgs),
}

/// Load configuration and install logging for a one-shot command.
///
/// Output goes to stderr in compact form so stdout carries only the result.
pub(crate) fn init_oneshot() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load()?;

    logging::init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: LogFormat::Compact,
    })?;

    Ok(config)
}
