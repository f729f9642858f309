//! Goodreads adapter against a mock HTTP server
//!
//! Run with: cargo test --test goodreads_client_test

mod common;

use std::time::Duration;

use bookshelf_core::adapters::goodreads::GoodreadsClient;
use bookshelf_core::ports::RatingProvider;
use bookshelf_core::Error;

use common::{MockConfig, MockGoodreadsServer};

fn client_for(server: &MockGoodreadsServer, timeout: Duration) -> GoodreadsClient {
    GoodreadsClient::new("test_key", &server.base_url(), timeout).unwrap()
}

#[tokio::test]
async fn test_lookup_string_rating() {
    let server =
        MockGoodreadsServer::start(MockConfig::default().with_book("0380795272", "\"3.87\"", 1204))
            .unwrap();
    let client = client_for(&server, Duration::from_secs(5));

    let rating = client.lookup("0380795272").await.unwrap();
    assert!((rating.average_rating - 3.87).abs() < 1e-9);
    assert_eq!(rating.review_count, 1204);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/book/review_counts.json?"));
    assert!(requests[0].contains("key=test_key"));
    assert!(requests[0].contains("isbns=0380795272"));
}

#[tokio::test]
async fn test_lookup_numeric_rating() {
    let server =
        MockGoodreadsServer::start(MockConfig::default().with_book("1416949658", "4.02", 7)).unwrap();
    let client = client_for(&server, Duration::from_secs(5));

    let rating = client.lookup("1416949658").await.unwrap();
    assert_eq!(rating.average_rating, 4.02);
    assert_eq!(rating.review_count, 7);
}

#[tokio::test]
async fn test_unknown_isbn_is_upstream_error() {
    let server = MockGoodreadsServer::start(MockConfig::default()).unwrap();
    let client = client_for(&server, Duration::from_secs(5));

    let err = client.lookup("0000000000").await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_server_error_is_upstream_error() {
    let config = MockConfig {
        fail: true,
        ..MockConfig::default().with_book("1", "4.0", 1)
    };
    let server = MockGoodreadsServer::start(config).unwrap();
    let client = client_for(&server, Duration::from_secs(5));

    assert!(matches!(client.lookup("1").await, Err(Error::Upstream(_))));
}

#[tokio::test]
async fn test_malformed_body_is_upstream_error() {
    let config = MockConfig {
        malformed: true,
        ..MockConfig::default()
    };
    let server = MockGoodreadsServer::start(config).unwrap();
    let client = client_for(&server, Duration::from_secs(5));

    let err = client.lookup("1").await.unwrap_err();
    assert!(err.to_string().contains("Malformed"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let config = MockConfig {
        delay_ms: 1500,
        ..MockConfig::default().with_book("1", "4.0", 1)
    };
    let server = MockGoodreadsServer::start(config).unwrap();
    let client = client_for(&server, Duration::from_millis(200));

    let err = client.lookup("1").await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_server() {
    // Bind then drop to get a port with nothing listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = GoodreadsClient::new(
        "test_key",
        &format!("http://127.0.0.1:{}", port),
        Duration::from_secs(2),
    )
    .unwrap();

    assert!(matches!(client.lookup("1").await, Err(Error::Upstream(_))));
}
