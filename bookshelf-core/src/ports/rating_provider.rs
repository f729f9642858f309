//! Rating provider port
//!
//! Defines the interface for looking up per-ISBN rating data from an
//! external rating service (Goodreads, test stubs, etc.)

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::RemoteRating;

/// External rating lookup
///
/// Implementations return `Error::Upstream` for any failure of the remote
/// service. Callers do not retry and have no fallback value.
#[async_trait]
pub trait RatingProvider: Send + Sync {
    /// Provider name (e.g., "goodreads")
    fn name(&self) -> &str;

    /// Fetch the remote average rating and review count for an ISBN
    async fn lookup(&self, isbn: &str) -> Result<RemoteRating>;
}
