//! Import command - bulk load books from CSV

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::{get_context, get_logger, log_with};
use crate::output;
use bookshelf_core::services::{ImportOptions, LogEvent};

pub fn run(file: &Path, has_headers: bool, preview: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    log_with(&logger, |l| l.log_command("import"));

    let options = ImportOptions {
        has_headers,
        preview_only: preview,
    };

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Importing {}", file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = ctx.import_service.import(file, &options);
    spinner.finish_and_clear();
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            let message = format!("{:#}", e);
            let source = file.display().to_string();
            log_with(&logger, |l| l.log_error("import_failed", &message, Some(&source)));
            return Err(e);
        }
    };

    if !preview {
        log_with(&logger, |l| {
            l.log(LogEvent::new("books_imported").with_route("import"))
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if preview {
        println!("{}", "Preview (nothing written)".bold());
        let mut table = output::create_table();
        table.set_header(vec!["ISBN", "Title", "Author", "Year"]);
        for book in &result.preview {
            table.add_row(vec![
                book.isbn.clone(),
                book.title.clone(),
                book.author.clone(),
                book.year.to_string(),
            ]);
        }
        println!("{}", table);
        if result.discovered > result.preview.len() as i64 {
            println!("  ... and {} more", result.discovered - result.preview.len() as i64);
        }
        println!();
    }

    let mut summary = output::create_table();
    summary.add_row(vec!["Discovered", &result.discovered.to_string()]);
    summary.add_row(vec!["Imported", &result.imported.to_string()]);
    summary.add_row(vec!["Skipped", &result.skipped.to_string()]);
    println!("{}", summary);

    for row in result.skipped_rows.iter().take(5) {
        output::warning(&format!("  line {}: {}", row.line, row.reason));
    }
    if result.skipped_rows.len() > 5 {
        output::warning(&format!("  ... {} more skipped", result.skipped_rows.len() - 5));
    }

    if !preview {
        output::success(&format!("Imported {} books", result.imported));
    }

    Ok(())
}
