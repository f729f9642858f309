//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod auth;
pub mod catalog;
pub mod import;
pub mod logging;
pub mod migration;
pub mod rating;
pub mod review;
mod status;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use import::{ImportOptions, ImportResult, ImportService, SkippedRow};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use rating::RatingService;
pub use review::ReviewService;
pub use status::{StatusService, StatusSummary};
