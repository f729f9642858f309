//! Rating aggregates shown on the book page and returned by the API

use serde::{Deserialize, Serialize};

use super::{Book, ReviewWithAuthor};

/// Rating data reported by the third-party rating service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteRating {
    pub average_rating: f64,
    pub review_count: i64,
}

/// Everything the book detail page needs
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub reviews: Vec<ReviewWithAuthor>,
    /// Mean of local review scores, 0 with no reviews
    pub local_average: f64,
    pub remote: RemoteRating,
}

/// JSON payload of `GET /api/{isbn}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookApiRecord {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: String,
    pub review_count: i64,
    pub average_score: f64,
}

impl BookApiRecord {
    pub fn new(book: Book, remote: RemoteRating) -> Self {
        Self {
            title: book.title,
            author: book.author,
            year: book.year,
            isbn: book.isbn,
            review_count: remote.review_count,
            average_score: remote.average_rating,
        }
    }
}
