//! Status command - show catalog counts

use anyhow::Result;
use colored::Colorize;

use super::{get_context, get_logger, log_with};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    log_with(&get_logger(), |l| l.log_command("status"));

    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Bookshelf Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Users", &status.total_users.to_string()]);
    table.add_row(vec!["Books", &status.total_books.to_string()]);
    table.add_row(vec!["Reviews", &status.total_reviews.to_string()]);
    println!("{}", table);
    println!();

    output::info(&format!("Database: {}", status.database_path));
    Ok(())
}
