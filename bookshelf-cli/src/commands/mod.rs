//! CLI command implementations

pub mod import;
pub mod logs;
pub mod serve;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bookshelf_core::config::{Config, LOG_DB_ENV};
use bookshelf_core::services::{EntryPoint, LoggingService};
use bookshelf_core::BookshelfContext;
use tracing::debug;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let path = log_db_path().ok()?;
    LoggingService::new(&path, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Write to the event log if one is open. Failures only reach debug output.
pub fn log_with<F>(logger: &Option<LoggingService>, write: F)
where
    F: FnOnce(&LoggingService) -> Result<()>,
{
    if let Some(l) = logger {
        if let Err(e) = write(l) {
            debug!("Failed to write event log entry: {}", e);
        }
    }
}

/// Event log location: `BOOKSHELF_LOG_DB`, else next to the catalog
pub fn log_db_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(LOG_DB_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(load_config()?.log_db_path)
}

pub fn load_config() -> Result<Config> {
    Config::from_env().context("Failed to load configuration")
}

/// Build the context from the environment
pub fn get_context() -> Result<BookshelfContext> {
    let config = load_config()?;
    BookshelfContext::new(config).context("Failed to initialize bookshelf context")
}
