//! Bookshelf Core - book catalog, reviews and the web front end
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Book, Review, User, etc.)
//! - **ports**: Trait definitions for external dependencies (RatingProvider)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, Goodreads, session files)
//! - **web**: HTTP routes, session gate and page rendering

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;
pub mod web;

use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use adapters::file_sessions::FileSessionStore;
use adapters::goodreads::GoodreadsClient;
use config::Config;
use ports::RatingProvider;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{Book, BookApiRecord, BookDetail, CurrentUser, NewBook, Review, User};

/// Main context for Bookshelf operations
///
/// Holds the catalog connection, the session store and every service. Both
/// the web server and the CLI start from here.
pub struct BookshelfContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub sessions: FileSessionStore,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub review_service: ReviewService,
    pub rating_service: RatingService,
    pub import_service: ImportService,
    pub status_service: StatusService,
}

impl BookshelfContext {
    /// Create a context that rates books through Goodreads
    pub fn new(config: Config) -> Result<Self> {
        let provider = GoodreadsClient::new(
            &config.goodreads_key,
            &config.goodreads_base_url,
            config.rating_timeout,
        )?;
        Self::with_provider(config, Arc::new(provider))
    }

    /// Create a context with an explicit rating provider
    pub fn with_provider(config: Config, provider: Arc<dyn RatingProvider>) -> Result<Self> {
        let repository = Arc::new(DuckDbRepository::new(&config.database_path)?);

        // Initialize schema
        repository.ensure_schema()?;

        let sessions = FileSessionStore::new(&config.session_dir, config.session_max_age)?;

        let auth_service = AuthService::new(Arc::clone(&repository));
        let catalog_service = CatalogService::new(Arc::clone(&repository));
        let review_service = ReviewService::new(Arc::clone(&repository));
        let rating_service = RatingService::new(Arc::clone(&repository), provider);
        let import_service = ImportService::new(Arc::clone(&repository));
        let status_service = StatusService::new(Arc::clone(&repository));

        Ok(Self {
            config,
            repository,
            sessions,
            auth_service,
            catalog_service,
            review_service,
            rating_service,
            import_service,
            status_service,
        })
    }
}
