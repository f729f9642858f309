//! Integration tests for bookshelf-core services
//!
//! These tests run against real DuckDB files in a TempDir. The rating
//! service is stubbed at the trait level.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use bookshelf_core::adapters::duckdb::DuckDbRepository;
use bookshelf_core::config::Config;
use bookshelf_core::services::ImportOptions;
use bookshelf_core::{BookshelfContext, Error, NewBook};

use common::StubRatings;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        database_path: temp_dir.path().join("books.duckdb"),
        goodreads_key: String::new(),
        goodreads_base_url: "http://127.0.0.1:9".to_string(),
        rating_timeout: Duration::from_secs(1),
        session_dir: temp_dir.path().join("sessions"),
        session_max_age: Duration::from_secs(3600),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        log_db_path: temp_dir.path().join("logs.duckdb"),
    }
}

fn create_context(temp_dir: &TempDir) -> BookshelfContext {
    BookshelfContext::with_provider(test_config(temp_dir), Arc::new(StubRatings::new(3.5, 40)))
        .expect("Failed to create context")
}

const CATALOG_CSV: &str = "isbn,title,author,year
0380795272,Krondor: The Betrayal,Raymond E. Feist,1998
1416949658,The Dark Is Rising,Susan Cooper,1973
1857231082,The Black Unicorn,Terry Brooks,1987
0553803700,\"I, Robot\",Isaac Asimov,1950
not,enough,columns
0765326353,The Way of Kings,Brandon Sanderson,twenty-ten
";

// ============================================================================
// Context and persistence
// ============================================================================

#[test]
fn test_context_creates_schema_and_session_dir() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    assert!(temp_dir.path().join("books.duckdb").exists());
    assert!(ctx.sessions.dir().exists());

    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.total_books, 0);
    assert_eq!(status.total_users, 0);
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = create_context(&temp_dir);
        ctx.auth_service.register("reader", "pw").unwrap();
        ctx.repository
            .insert_book(&NewBook::new("0441172717", "Dune", "Frank Herbert", 1965))
            .unwrap();
    }

    let ctx = create_context(&temp_dir);
    assert!(ctx.auth_service.login("reader", "pw").is_ok());
    assert_eq!(ctx.catalog_service.search("dune").unwrap().len(), 1);

    // migrations are not re-applied
    let result = ctx.repository.run_migrations().unwrap();
    assert!(result.applied.is_empty());
}

// ============================================================================
// Import then browse
// ============================================================================

#[test]
fn test_import_file_then_search_and_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    let csv_path = temp_dir.path().join("books.csv");
    std::fs::write(&csv_path, CATALOG_CSV).unwrap();

    let result = ctx
        .import_service
        .import(&csv_path, &ImportOptions::default())
        .unwrap();
    assert_eq!(result.discovered, 4);
    assert_eq!(result.imported, 4);
    assert_eq!(result.skipped, 2);

    let hits = ctx.catalog_service.search("the").unwrap();
    let titles: Vec<&str> = hits.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Krondor: The Betrayal", "The Dark Is Rising", "The Black Unicorn"]
    );

    let robot = ctx.catalog_service.find_by_isbn("0553803700").unwrap();
    assert_eq!(robot.title, "I, Robot");
    assert_eq!(robot.year, 1950);
}

#[test]
fn test_import_is_not_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    for _ in 0..2 {
        ctx.import_service
            .import_reader(CATALOG_CSV.as_bytes(), &ImportOptions::default())
            .unwrap();
    }
    assert_eq!(ctx.repository.get_book_count().unwrap(), 8);

    // duplicate isbns resolve to the earliest row
    let first = ctx.catalog_service.find_by_isbn("1416949658").unwrap();
    let all = ctx.catalog_service.search("1416949658").unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(first.id, all[0].id);
}

#[test]
fn test_missing_import_file() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);

    let err = ctx
        .import_service
        .import(&temp_dir.path().join("nope.csv"), &ImportOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read CSV file"));
}

// ============================================================================
// Reviews and ratings
// ============================================================================

#[tokio::test]
async fn test_reviews_feed_local_average() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_context(&temp_dir);
    let book_id = ctx
        .repository
        .insert_book(&NewBook::new("0312853238", "Ender's Game", "Orson Scott Card", 1985))
        .unwrap();

    let empty = ctx.rating_service.book_detail(book_id).await.unwrap();
    assert_eq!(empty.local_average, 0.0);
    assert_eq!(empty.remote.review_count, 40);

    for (name, score) in [("a", "5"), ("b", "4"), ("c", "2")] {
        let user = ctx.auth_service.register(name, "pw").unwrap();
        ctx.review_service.submit(user.id, book_id, score, "").unwrap();
    }

    let detail = ctx.rating_service.book_detail(book_id).await.unwrap();
    assert_eq!(detail.reviews.len(), 3);
    assert!((detail.local_average - 11.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_unique_review_constraint_holds_at_the_store() {
    let temp_dir = TempDir::new().unwrap();
    let repo = DuckDbRepository::new(&temp_dir.path().join("raw.duckdb")).unwrap();
    repo.ensure_schema().unwrap();

    let user = repo.insert_user("critic", "hash").unwrap();
    let book_id = repo.insert_book(&NewBook::new("1", "T", "A", 2000)).unwrap();

    repo.insert_review(user.id, book_id, 3, "first").unwrap();
    let err = repo.insert_review(user.id, book_id, 4, "second").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(repo.count_reviews_for(user.id, book_id).unwrap(), 1);
}
