//! Catalog service - book search and lookup

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::{Error, Result};
use crate::domain::Book;

pub const MIN_QUERY_CHARS: usize = 3;
pub const QUERY_TOO_SHORT: &str = "Please search for more than 2 characters";
pub const NO_SUCH_BOOK: &str = "No such book.";
pub const NO_SUCH_ISBN: &str = "No book isbn found";

/// Catalog service for searching books
pub struct CatalogService {
    repository: Arc<DuckDbRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Search isbn, title and author (case-insensitive substring, OR)
    pub fn search(&self, query: &str) -> Result<Vec<Book>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(Error::validation(QUERY_TOO_SHORT));
        }
        self.repository.search_books(query)
    }

    pub fn get_book(&self, book_id: i64) -> Result<Book> {
        self.repository
            .get_book(book_id)?
            .ok_or_else(|| Error::not_found(NO_SUCH_BOOK))
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Result<Book> {
        self.repository
            .find_book_by_isbn(isbn.trim())?
            .ok_or_else(|| Error::not_found(NO_SUCH_ISBN))
    }
}
