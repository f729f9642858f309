//! Status service - catalog summary

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;

/// Status service for catalog summaries
pub struct StatusService {
    repository: Arc<DuckDbRepository>,
}

impl StatusService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    pub fn get_status(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            database_path: self
                .repository
                .db_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            total_users: self.repository.get_user_count()?,
            total_books: self.repository.get_book_count()?,
            total_reviews: self.repository.get_review_count()?,
        })
    }
}

/// Status summary
#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub database_path: String,
    pub total_users: i64,
    pub total_books: i64,
    pub total_reviews: i64,
}
