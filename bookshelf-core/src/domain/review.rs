//! Review domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// A user's review of a book. At most one exists per (user, book).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub score: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A review joined with its author's username, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewWithAuthor {
    pub username: String,
    pub score: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Parse a submitted score, accepting whole numbers from 1 to 5
pub fn parse_score(raw: &str) -> Result<i32> {
    let score: i32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation("Score must be a whole number from 1 to 5"))?;

    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(Error::validation("Score must be a whole number from 1 to 5"));
    }

    Ok(score)
}

/// Arithmetic mean of the given scores, 0 when there are none
pub fn average_score(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    total as f64 / scores.len() as f64
}
