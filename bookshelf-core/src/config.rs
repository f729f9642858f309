//! Configuration management
//!
//! All settings come from environment variables:
//!
//! ```text
//! DATABASE_URL         required, DuckDB file path (optional duckdb:// prefix)
//! GOODREADS_KEY        rating service key
//! GOODREADS_BASE_URL   rating service base URL (for staging or tests)
//! RATING_TIMEOUT_SECS  rating request timeout, default 10
//! SESSION_DIR          session file directory, default ./sessions
//! SESSION_MAX_AGE_SECS session lifetime, default 31 days
//! BIND_ADDRESS         listen address, default 127.0.0.1:5000
//! BOOKSHELF_LOG_DB     event log database, default logs.duckdb beside the catalog
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::adapters::goodreads::GOODREADS_PRODUCTION_URL;
use crate::domain::result::{Error, Result};

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const GOODREADS_KEY_ENV: &str = "GOODREADS_KEY";
pub const GOODREADS_BASE_URL_ENV: &str = "GOODREADS_BASE_URL";
pub const RATING_TIMEOUT_ENV: &str = "RATING_TIMEOUT_SECS";
pub const SESSION_DIR_ENV: &str = "SESSION_DIR";
pub const SESSION_MAX_AGE_ENV: &str = "SESSION_MAX_AGE_SECS";
pub const BIND_ADDRESS_ENV: &str = "BIND_ADDRESS";
pub const LOG_DB_ENV: &str = "BOOKSHELF_LOG_DB";

const DEFAULT_RATING_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_DIR: &str = "sessions";
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 31 * 24 * 60 * 60;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

/// Bookshelf configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub goodreads_key: String,
    pub goodreads_base_url: String,
    pub rating_timeout: Duration,
    pub session_dir: PathBuf,
    pub session_max_age: Duration,
    pub bind_address: SocketAddr,
    pub log_db_path: PathBuf,
}

impl Config {
    /// Load config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup
    ///
    /// Fails if `DATABASE_URL` is absent or any value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var(DATABASE_URL_ENV)
            .ok_or_else(|| Error::Config(format!("{} is not set", DATABASE_URL_ENV)))?;
        let database_path = parse_database_url(&database_url);

        let goodreads_key = var(GOODREADS_KEY_ENV).unwrap_or_else(|| {
            warn!("{} not set, rating lookups will be sent without a key", GOODREADS_KEY_ENV);
            String::new()
        });

        let goodreads_base_url =
            var(GOODREADS_BASE_URL_ENV).unwrap_or_else(|| GOODREADS_PRODUCTION_URL.to_string());

        let rating_timeout = Duration::from_secs(parse_or_default(
            RATING_TIMEOUT_ENV,
            var(RATING_TIMEOUT_ENV),
            DEFAULT_RATING_TIMEOUT_SECS,
        )?);

        let session_dir = var(SESSION_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR));

        let session_max_age = Duration::from_secs(parse_or_default(
            SESSION_MAX_AGE_ENV,
            var(SESSION_MAX_AGE_ENV),
            DEFAULT_SESSION_MAX_AGE_SECS,
        )?);
        if session_max_age.is_zero() {
            return Err(Error::Config(format!("{} must be positive", SESSION_MAX_AGE_ENV)));
        }

        let bind_address = parse_or_default(
            BIND_ADDRESS_ENV,
            var(BIND_ADDRESS_ENV),
            DEFAULT_BIND_ADDRESS
                .parse()
                .map_err(|e| Error::Config(format!("bad default bind address: {}", e)))?,
        )?;

        let log_db_path = var(LOG_DB_ENV).map(PathBuf::from).unwrap_or_else(|| {
            database_path
                .parent()
                .map(|dir| dir.join("logs.duckdb"))
                .unwrap_or_else(|| PathBuf::from("logs.duckdb"))
        });

        Ok(Self {
            database_path,
            goodreads_key,
            goodreads_base_url,
            rating_timeout,
            session_dir,
            session_max_age,
            bind_address,
            log_db_path,
        })
    }
}

/// Strip an optional `duckdb://` scheme
fn parse_database_url(url: &str) -> PathBuf {
    let trimmed = url.trim();
    PathBuf::from(trimmed.strip_prefix("duckdb://").unwrap_or(trimmed))
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {} value '{}': {}", key, value, e))),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
