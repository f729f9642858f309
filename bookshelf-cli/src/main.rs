//! Bookshelf CLI - run the review site and maintain its catalog

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{import, logs, serve, status};

/// Bookshelf - book search and reviews
#[derive(Parser)]
#[command(name = "bookshelf", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Listen address (overrides BIND_ADDRESS)
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },

    /// Import books from a CSV file (isbn,title,author,year)
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// The file has no header row
        #[arg(long)]
        no_header: bool,
        /// Preview without importing
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show catalog status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { bind } => serve::run(bind),
        Commands::Import {
            file,
            no_header,
            preview,
            json,
        } => import::run(&file, !no_header, preview, json),
        Commands::Status { json } => status::run(json),
        Commands::Logs { command } => logs::run(command),
    }
}
