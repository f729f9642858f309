use std::sync::Arc;

use tracing::debug;

use crate::services::{LogEvent, LoggingService};
use crate::BookshelfContext;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<BookshelfContext>,
    pub logger: Option<Arc<LoggingService>>,
}

impl AppState {
    pub fn new(context: Arc<BookshelfContext>, logger: Option<Arc<LoggingService>>) -> Self {
        Self { context, logger }
    }

    /// Record a product event. Event log failures never fail a request.
    pub fn record(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log(event) {
                debug!("Failed to record event: {:#}", e);
            }
        }
    }
}
