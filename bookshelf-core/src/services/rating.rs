//! Rating service - blends local reviews with the third-party rating

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::Result;
use crate::domain::review::average_score;
use crate::domain::{BookApiRecord, BookDetail};
use crate::ports::RatingProvider;

use super::catalog::CatalogService;

pub struct RatingService {
    repository: Arc<DuckDbRepository>,
    catalog: CatalogService,
    provider: Arc<dyn RatingProvider>,
}

impl RatingService {
    pub fn new(repository: Arc<DuckDbRepository>, provider: Arc<dyn RatingProvider>) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&repository)),
            repository,
            provider,
        }
    }

    /// Book, its reviews, the local average and the remote rating
    ///
    /// A failed rating lookup fails the whole request.
    pub async fn book_detail(&self, book_id: i64) -> Result<BookDetail> {
        let book = self.catalog.get_book(book_id)?;
        let reviews = self.repository.get_reviews_for_book(book_id)?;

        let scores: Vec<i32> = reviews.iter().map(|r| r.score).collect();
        let local_average = average_score(&scores);

        let remote = self.provider.lookup(&book.isbn).await.map_err(|e| {
            warn!(provider = self.provider.name(), book_id, "Rating lookup failed: {}", e);
            e
        })?;
        debug!(book_id, review_count = remote.review_count, "Fetched remote rating");

        Ok(BookDetail {
            book,
            reviews,
            local_average,
            remote,
        })
    }

    /// Record for `GET /api/{isbn}`
    ///
    /// An unknown ISBN is `NotFound` without contacting the provider.
    pub async fn api_record(&self, isbn: &str) -> Result<BookApiRecord> {
        let book = self.catalog.find_by_isbn(isbn)?;

        let remote = self.provider.lookup(&book.isbn).await?;
        Ok(BookApiRecord::new(book, remote))
    }
}
