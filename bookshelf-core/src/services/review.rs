//! Review service - one review per user per book

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::{Error, Result};
use crate::domain::review::parse_score;
use crate::domain::Review;

use super::catalog::CatalogService;

pub const ALREADY_REVIEWED: &str = "You already reviewed this book";

/// Review service for submitting reviews
pub struct ReviewService {
    repository: Arc<DuckDbRepository>,
    catalog: CatalogService,
}

impl ReviewService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// Submit a review for `book_id` on behalf of `user_id`
    ///
    /// The pre-check gives the friendly message in the common case; the
    /// schema's unique constraint settles concurrent submissions.
    pub fn submit(&self, user_id: i64, book_id: i64, raw_score: &str, body: &str) -> Result<Review> {
        self.catalog.get_book(book_id)?;

        if self.repository.get_review(user_id, book_id)?.is_some() {
            return Err(Error::validation(ALREADY_REVIEWED));
        }

        let score = parse_score(raw_score)?;

        match self.repository.insert_review(user_id, book_id, score, body.trim()) {
            Ok(review) => Ok(review),
            Err(Error::Conflict(_)) => Err(Error::validation(ALREADY_REVIEWED)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBook;

    fn setup() -> (Arc<DuckDbRepository>, ReviewService, i64, i64) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let user = repo.insert_user("critic", "hash").unwrap();
        let book_id = repo
            .insert_book(&NewBook::new("0312853238", "Ender's Game", "Orson Scott Card", 1985))
            .unwrap();
        (Arc::clone(&repo), ReviewService::new(repo), user.id, book_id)
    }

    #[test]
    fn test_second_review_rejected() {
        let (repo, reviews, user_id, book_id) = setup();

        let first = reviews.submit(user_id, book_id, "5", "Loved it").unwrap();
        assert_eq!(first.score, 5);

        for attempt in ["4", "1", "5"] {
            let err = reviews.submit(user_id, book_id, attempt, "again").unwrap_err();
            assert_eq!(err.user_message(), ALREADY_REVIEWED);
        }
        assert_eq!(repo.count_reviews_for(user_id, book_id).unwrap(), 1);
    }

    #[test]
    fn test_review_of_missing_book() {
        let (_repo, reviews, user_id, _book_id) = setup();
        let err = reviews.submit(user_id, 4242, "3", "ghost").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_bad_score_rejected_and_nothing_stored() {
        let (repo, reviews, user_id, book_id) = setup();
        let err = reviews.submit(user_id, book_id, "11", "too enthusiastic").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(repo.count_reviews_for(user_id, book_id).unwrap(), 0);
    }
}
