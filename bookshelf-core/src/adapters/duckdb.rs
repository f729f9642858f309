//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use duckdb::{params, Connection};
use tracing::warn;

use crate::domain::result::{Error, Result};
use crate::domain::{Book, NewBook, Review, ReviewWithAuthor, User};
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
}

/// Check if an error was raised by a UNIQUE or PRIMARY KEY constraint
fn is_unique_violation(err: &duckdb::Error) -> bool {
    let lower = err.to_string().to_lowercase();
    lower.contains("duplicate key") || lower.contains("violates unique constraint")
}

fn from_epoch_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

/// DuckDB repository implementation
///
/// Owns the single catalog connection. Every statement auto-commits except
/// bulk book inserts, which run in one transaction.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file at `db_path`
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            "Database busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(Error::from)
            .unwrap_or_else(|| Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))))
    }

    /// Open a throwaway in-memory database (tests, previews)
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> std::result::Result<Connection, duckdb::Error> {
        // Extension autoloading stays off; nothing here needs network access
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Path of the backing file (None for in-memory databases)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<crate::services::MigrationResult> {
        let conn = self.lock()?;
        let result = MigrationService::new(&conn).run_pending()?;
        Ok(result)
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === Users ===

    /// Insert a user. Returns `Error::Conflict` if the username is taken.
    pub fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let conn = self.lock()?;
        let inserted = conn.query_row(
            "INSERT INTO users (username, password_hash) VALUES (?, ?)
             RETURNING id, username, password_hash, epoch_ms(created_at)",
            params![username, password_hash],
            |row| Self::row_to_user(row),
        );

        match inserted {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::conflict(format!("username '{}' already exists", username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, epoch_ms(created_at)
             FROM users WHERE username = ?",
        )?;
        let mut rows = stmt.query_map([username], |row| Self::row_to_user(row))?;
        Ok(rows.next().transpose()?)
    }

    fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: from_epoch_ms(row.get(3)?),
        })
    }

    // === Books ===

    /// Insert a single book, returning its id
    pub fn insert_book(&self, book: &NewBook) -> Result<i64> {
        let conn = self.lock()?;
        let id = conn.query_row(
            "INSERT INTO books (isbn, title, author, year) VALUES (?, ?, ?, ?) RETURNING id",
            params![book.isbn, book.title, book.author, book.year],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Insert many books in one transaction. No duplicate check is made.
    pub fn insert_books(&self, books: &[NewBook]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO books (isbn, title, author, year) VALUES (?, ?, ?, ?)")?;
            for book in books {
                stmt.execute(params![book.isbn, book.title, book.author, book.year])?;
            }
        }
        tx.commit()?;
        Ok(books.len())
    }

    pub fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, isbn, title, author, year FROM books WHERE id = ?")?;
        let mut rows = stmt.query_map([id], |row| Self::row_to_book(row))?;
        Ok(rows.next().transpose()?)
    }

    /// Find a book by ISBN, ignoring case. The lowest id wins if the
    /// import produced duplicates.
    pub fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, isbn, title, author, year FROM books
             WHERE lower(isbn) = lower(?)
             ORDER BY id LIMIT 1",
        )?;
        let mut rows = stmt.query_map([isbn], |row| Self::row_to_book(row))?;
        Ok(rows.next().transpose()?)
    }

    /// Case-insensitive literal substring match on isbn, title or author
    pub fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, isbn, title, author, year FROM books
             WHERE contains(lower(isbn), lower($1))
                OR contains(lower(title), lower($1))
                OR contains(lower(author), lower($1))
             ORDER BY id",
        )?;
        let books = stmt
            .query_map([query], |row| Self::row_to_book(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn row_to_book(row: &duckdb::Row) -> duckdb::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            isbn: row.get(1)?,
            title: row.get(2)?,
            author: row.get(3)?,
            year: row.get(4)?,
        })
    }

    // === Reviews ===

    pub fn get_review(&self, user_id: i64, book_id: i64) -> Result<Option<Review>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, book_id, score, body, epoch_ms(created_at)
             FROM reviews WHERE user_id = ? AND book_id = ?",
        )?;
        let mut rows = stmt.query_map(params![user_id, book_id], |row| {
            Ok(Review {
                id: row.get(0)?,
                user_id: row.get(1)?,
                book_id: row.get(2)?,
                score: row.get(3)?,
                body: row.get(4)?,
                created_at: from_epoch_ms(row.get(5)?),
            })
        })?;
        Ok(rows.next().transpose()?)
    }

    /// Insert a review. Returns `Error::Conflict` when the (user, book)
    /// pair already has one, even if a concurrent request won the race.
    pub fn insert_review(&self, user_id: i64, book_id: i64, score: i32, body: &str) -> Result<Review> {
        let conn = self.lock()?;
        let inserted = conn.query_row(
            "INSERT INTO reviews (user_id, book_id, score, body) VALUES (?, ?, ?, ?)
             RETURNING id, epoch_ms(created_at)",
            params![user_id, book_id, score, body],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        );

        match inserted {
            Ok((id, created_ms)) => Ok(Review {
                id,
                user_id,
                book_id,
                score,
                body: body.to_string(),
                created_at: from_epoch_ms(created_ms),
            }),
            Err(e) if is_unique_violation(&e) => Err(Error::conflict(format!(
                "user {} already reviewed book {}",
                user_id, book_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Reviews of a book with their authors, oldest first
    pub fn get_reviews_for_book(&self, book_id: i64) -> Result<Vec<ReviewWithAuthor>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT u.username, r.score, r.body, epoch_ms(r.created_at)
             FROM reviews r JOIN users u ON u.id = r.user_id
             WHERE r.book_id = ?
             ORDER BY r.created_at, r.id",
        )?;
        let reviews = stmt
            .query_map([book_id], |row| {
                Ok(ReviewWithAuthor {
                    username: row.get(0)?,
                    score: row.get(1)?,
                    body: row.get(2)?,
                    created_at: from_epoch_ms(row.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    pub fn count_reviews_for(&self, user_id: i64, book_id: i64) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE user_id = ? AND book_id = ?",
            params![user_id, book_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Counts ===

    pub fn get_user_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM users")
    }

    pub fn get_book_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM books")
    }

    pub fn get_review_count(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM reviews")
    }

    fn count(&self, sql: &str) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count)
    }
}
