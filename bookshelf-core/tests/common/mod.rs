//! Shared test fixtures
//!
//! - `MockGoodreadsServer`: a tiny HTTP server answering
//!   `GET /book/review_counts.json` the way the real service does
//! - `StubRatings`: an in-process `RatingProvider`

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;

use bookshelf_core::domain::RemoteRating;
use bookshelf_core::ports::RatingProvider;
use bookshelf_core::{Error, Result};

/// Behaviour of the mock server
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// isbn -> raw JSON object for the `books` array
    pub books: HashMap<String, String>,
    /// Answer every request with HTTP 500
    pub fail: bool,
    /// Answer with a body that is not JSON
    pub malformed: bool,
    /// Delay before responding
    pub delay_ms: u64,
}

impl MockConfig {
    pub fn with_book(mut self, isbn: &str, average_rating: &str, text_reviews_count: i64) -> Self {
        self.books.insert(
            isbn.to_string(),
            format!(
                r#"{{"id":1,"isbn":"{}","text_reviews_count":{},"average_rating":{}}}"#,
                isbn, text_reviews_count, average_rating
            ),
        );
        self
    }
}

/// Mock Goodreads server for testing
pub struct MockGoodreadsServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<String>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockGoodreadsServer {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let requests_clone = Arc::clone(&requests);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = Arc::clone(&requests_clone);
                        thread::spawn(move || handle_connection(stream, &cfg, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Request targets received so far (path plus query)
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockGoodreadsServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, log: &Mutex<Vec<String>>) {
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];
    let Ok(n) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(&buffer[..n]);

    if config.delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.delay_ms));
    }

    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    log.lock().unwrap().push(target.clone());

    if config.fail {
        send_response(&mut stream, 500, "Internal Server Error", r#"{"error":"boom"}"#);
        return;
    }
    if config.malformed {
        send_response(&mut stream, 200, "OK", "<html>not json</html>");
        return;
    }

    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
    if path != "/book/review_counts.json" {
        send_response(&mut stream, 404, "Not Found", r#"{"error":"Endpoint not found"}"#);
        return;
    }

    let isbn = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "isbns")
        .map(|(_, v)| v)
        .unwrap_or("");

    match config.books.get(isbn) {
        Some(book) => send_response(&mut stream, 200, "OK", &format!(r#"{{"books":[{}]}}"#, book)),
        None => send_response(&mut stream, 404, "Not Found", r#"{"error":"No book with that ISBN"}"#),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// In-process rating provider with a fixed answer
pub struct StubRatings {
    pub rating: RemoteRating,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubRatings {
    pub fn new(average_rating: f64, review_count: i64) -> Self {
        Self {
            rating: RemoteRating {
                average_rating,
                review_count,
            },
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0.0, 0)
        }
    }
}

#[async_trait]
impl RatingProvider for StubRatings {
    fn name(&self) -> &str {
        "stub"
    }

    async fn lookup(&self, _isbn: &str) -> Result<RemoteRating> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::upstream("stub rating service is down"));
        }
        Ok(self.rating)
    }
}
