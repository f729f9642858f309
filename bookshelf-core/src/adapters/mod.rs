//! Adapter implementations
//!
//! Adapters implement the ports and storage concerns with concrete technologies:
//! - DuckDB for the catalog repository
//! - Goodreads HTTP client for the RatingProvider port
//! - Local filesystem for session storage

pub mod duckdb;
pub mod file_sessions;
pub mod goodreads;
