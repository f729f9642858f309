//! Serve command - run the web server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookshelf_core::services::{EntryPoint, LoggingService};
use bookshelf_core::web::{self, AppState};
use bookshelf_core::BookshelfContext;
use tracing::warn;

use super::load_config;

pub fn run(bind: Option<SocketAddr>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(address) = bind {
        config.bind_address = address;
    }
    let address = config.bind_address;

    let logger = match LoggingService::new(
        &config.log_db_path,
        EntryPoint::Server,
        env!("CARGO_PKG_VERSION"),
    ) {
        Ok(logger) => Some(Arc::new(logger)),
        Err(e) => {
            warn!("Event log unavailable, continuing without it: {:#}", e);
            None
        }
    };

    let context = BookshelfContext::new(config).context("Failed to initialize bookshelf context")?;
    let state = AppState::new(Arc::new(context), logger);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(web::serve(state, address))?;
    Ok(())
}
