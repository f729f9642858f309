//! Goodreads rating client
//!
//! Looks up review counts and average ratings through the Goodreads
//! `book/review_counts.json` endpoint:
//!
//! ```text
//! GET {base}/book/review_counts.json?key=KEY&isbns=ISBN
//! { "books": [ { "isbn": "...", "text_reviews_count": 123, "average_rating": "3.87", ... } ] }
//! ```

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::RemoteRating;
use crate::ports::RatingProvider;

/// Default production API URL
pub const GOODREADS_PRODUCTION_URL: &str = "https://www.goodreads.com";

// =============================================================================
// API Response Models
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReviewCountsResponse {
    books: Vec<GoodreadsBook>,
}

#[derive(Debug, Deserialize)]
struct GoodreadsBook {
    #[serde(deserialize_with = "deserialize_count")]
    text_reviews_count: i64,
    /// Sent as a string ("3.87") by the real API
    #[serde(deserialize_with = "deserialize_rating")]
    average_rating: f64,
}

/// Deserialize a count that can be number or string
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("invalid count: {}", n))),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid count: {}", e))),
        _ => Err(D::Error::custom("expected number or string for count")),
    }
}

/// Deserialize a rating that can be number or string
fn deserialize_rating<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("invalid rating: {}", n))),
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("invalid rating: {}", e))),
        _ => Err(D::Error::custom("expected number or string for rating")),
    }
}

// =============================================================================
// Goodreads HTTP Client
// =============================================================================

/// Goodreads API client
#[derive(Debug)]
pub struct GoodreadsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoodreadsClient {
    /// Create a client for the given base URL.
    ///
    /// An empty key is accepted; the remote service decides whether to
    /// serve the request.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_request_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::upstream("Goodreads request timed out")
        } else if err.is_connect() {
            Error::upstream(format!("Could not connect to Goodreads: {}", err))
        } else {
            Error::upstream(format!("Goodreads request failed: {}", err))
        }
    }
}

#[async_trait]
impl RatingProvider for GoodreadsClient {
    fn name(&self) -> &str {
        "goodreads"
    }

    async fn lookup(&self, isbn: &str) -> Result<RemoteRating> {
        let url = format!("{}/book/review_counts.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("isbns", isbn)])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(format!(
                "Goodreads returned HTTP {} for isbn {}",
                status.as_u16(),
                isbn
            )));
        }

        let payload: ReviewCountsResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Malformed Goodreads response: {}", e)))?;

        let book = payload
            .books
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream(format!("Goodreads has no entry for isbn {}", isbn)))?;

        Ok(RemoteRating {
            average_rating: book.average_rating,
            review_count: book.text_reviews_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_rating() {
        let json = r#"{"books":[{"id":29207858,"isbn":"1632168146","text_reviews_count":3,"average_rating":"4.07"}]}"#;
        let parsed: ReviewCountsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.books[0].text_reviews_count, 3);
        assert!((parsed.books[0].average_rating - 4.07).abs() < 1e-9);
    }

    #[test]
    fn test_parse_numeric_rating_and_string_count() {
        let json = r#"{"books":[{"text_reviews_count":"12","average_rating":3.5}]}"#;
        let parsed: ReviewCountsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.books[0].text_reviews_count, 12);
        assert_eq!(parsed.books[0].average_rating, 3.5);
    }

    #[test]
    fn test_rejects_missing_fields() {
        let json = r#"{"books":[{"average_rating":"3.1"}]}"#;
        assert!(serde_json::from_str::<ReviewCountsResponse>(json).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GoodreadsClient::new("k", "http://localhost:1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:1");
        assert_eq!(client.name(), "goodreads");
    }
}
