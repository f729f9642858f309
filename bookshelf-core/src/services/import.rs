//! Import service - CSV book catalog import
//!
//! Expects four columns in order: isbn, title, author, year. Rows that
//! cannot be read as a book are counted and skipped; the rest are inserted
//! in a single transaction.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::NewBook;

const PREVIEW_ROWS: usize = 10;

/// Import options for CSV processing
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// First row holds column names
    pub has_headers: bool,
    /// Parse and report without writing
    pub preview_only: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            preview_only: false,
        }
    }
}

/// A row that was not imported
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub reason: String,
}

/// Import service for CSV imports
pub struct ImportService {
    repository: Arc<DuckDbRepository>,
}

impl ImportService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Import books from a CSV file
    pub fn import(&self, file_path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let file = std::fs::File::open(file_path)
            .with_context(|| format!("Failed to read CSV file: {}", file_path.display()))?;
        self.import_reader(file, options)
    }

    /// Import books from any CSV source
    pub fn import_reader<R: Read>(&self, source: R, options: &ImportOptions) -> Result<ImportResult> {
        let (books, skipped_rows) = parse_books(source, options.has_headers)?;

        let discovered = books.len() as i64;
        let imported = if options.preview_only {
            0
        } else {
            self.repository.insert_books(&books)? as i64
        };

        Ok(ImportResult {
            discovered,
            imported,
            skipped: skipped_rows.len() as i64,
            skipped_rows,
            preview: books.into_iter().take(PREVIEW_ROWS).collect(),
        })
    }
}

/// Parse CSV records into books, collecting the rows that don't fit
pub fn parse_books<R: Read>(source: R, has_headers: bool) -> Result<(Vec<NewBook>, Vec<SkippedRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut books = Vec::new();
    let mut skipped = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                if e.is_io_error() {
                    return Err(e).context("Failed to read CSV file");
                }
                skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match parse_record(&record) {
            Ok(book) => books.push(book),
            Err(reason) => skipped.push(SkippedRow { line, reason }),
        }
    }

    Ok((books, skipped))
}

fn parse_record(record: &csv::StringRecord) -> std::result::Result<NewBook, String> {
    if record.len() != 4 {
        return Err(format!("expected 4 columns, found {}", record.len()));
    }

    let isbn = &record[0];
    let title = &record[1];
    let author = &record[2];
    if isbn.is_empty() || title.is_empty() {
        return Err("isbn and title are required".to_string());
    }

    let year: i32 = record[3]
        .parse()
        .map_err(|_| format!("year '{}' is not a whole number", &record[3]))?;

    Ok(NewBook::new(isbn, title, author, year))
}

/// Outcome of an import run
#[derive(Debug, Serialize)]
pub struct ImportResult {
    /// Rows that parsed as books
    pub discovered: i64,
    /// Books written, zero in preview mode
    pub imported: i64,
    pub skipped: i64,
    pub skipped_rows: Vec<SkippedRow>,
    pub preview: Vec<NewBook>,
}
