//! Concurrent write tests
//!
//! Many threads race the same check-then-insert paths against one shared
//! repository. The schema constraints must leave exactly one winner.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use bookshelf_core::adapters::duckdb::DuckDbRepository;
use bookshelf_core::services::auth::REGISTRATION_FAILED;
use bookshelf_core::services::review::ALREADY_REVIEWED;
use bookshelf_core::services::{AuthService, ReviewService};
use bookshelf_core::NewBook;

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let repo = DuckDbRepository::new(&temp_dir.path().join("test_concurrent.duckdb"))
        .expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

#[test]
fn test_concurrent_reviews_for_same_book() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let user_id = repo.insert_user("critic", "hash").unwrap().id;
    let book_id = repo
        .insert_book(&NewBook::new("0060853980", "Good Omens", "Terry Pratchett", 1990))
        .unwrap();

    let service = Arc::new(ReviewService::new(Arc::clone(&repo)));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let rejected_count = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|i| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let success_count = Arc::clone(&success_count);
            let rejected_count = Arc::clone(&rejected_count);

            thread::spawn(move || {
                barrier.wait();
                let score = ((i % 5) + 1).to_string();
                match service.submit(user_id, book_id, &score, "race") {
                    Ok(_) => {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => {
                        assert_eq!(e.user_message(), ALREADY_REVIEWED);
                        rejected_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(success_count.load(Ordering::SeqCst), 1);
    assert_eq!(rejected_count.load(Ordering::SeqCst), THREAD_COUNT - 1);
    assert_eq!(repo.count_reviews_for(user_id, book_id).unwrap(), 1);
}

#[test]
fn test_concurrent_registrations_for_same_username() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let auth = Arc::new(AuthService::new(Arc::clone(&repo)));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|i| {
            let auth = Arc::clone(&auth);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                auth.register("popular", &format!("password-{}", i))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.user_message(), REGISTRATION_FAILED);
    }
    assert_eq!(repo.get_user_count().unwrap(), 1);
}

#[test]
fn test_distinct_users_review_concurrently() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let book_id = repo.insert_book(&NewBook::new("1", "T", "A", 2000)).unwrap();
    let user_ids: Vec<i64> = (0..THREAD_COUNT)
        .map(|i| repo.insert_user(&format!("user{}", i), "hash").unwrap().id)
        .collect();

    let service = Arc::new(ReviewService::new(Arc::clone(&repo)));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = user_ids
        .into_iter()
        .map(|user_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.submit(user_id, book_id, "4", "").unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(repo.get_review_count().unwrap(), THREAD_COUNT as i64);
}
