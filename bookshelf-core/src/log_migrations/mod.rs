//! Event log database migrations
//!
//! The event log lives in its own DuckDB file (`logs.duckdb`) so that it can be
//! inspected or cleared without touching the catalog. Same layout as
//! `crate::migrations`: ordered (filename, sql) pairs embedded at build time.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
