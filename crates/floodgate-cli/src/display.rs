//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Resource changes with coloured diffs
//! - Sync summaries with failed resources grouped at the end

use console::style;
use floodgate_sync::{LineType, ResourceChange, SyncSummary, diff::classify_line};

/// Print one change with a header and its diff
pub fn print_change(change: &ResourceChange) {
    let id = if change.id.is_empty() {
        String::new()
    } else {
        format!(" {}", style(format!("({})", change.id)).dim())
    };
    println!(
        "{} {} {}{}",
        style("~").yellow().bold(),
        style(change.kind).bold(),
        style(&change.name).cyan(),
        id
    );

    for line in change.changes.lines() {
        println!("    {}", colorize_line(line));
    }
    println!();
}

/// Colour a rendered diff line by its prefix
fn colorize_line(line: &str) -> String {
    if line.starts_with("@@") {
        return style(line).cyan().dim().to_string();
    }
    match classify_line(line) {
        LineType::Added => style(line).green().to_string(),
        LineType::Removed => style(line).red().to_string(),
        LineType::Context => style(line).dim().to_string(),
    }
}

/// Print the closing line of `compare`
pub fn print_compare_footer(changes: usize, total: usize) {
    if changes == 0 {
        println!(
            "{} All {} resource(s) in sync with Gate",
            style("✓").green().bold(),
            total
        );
    } else {
        println!(
            "{} {} of {} resource(s) differ from Gate",
            style("!").yellow().bold(),
            changes,
            total
        );
    }
}

/// Print a sync summary, failures last
pub fn print_summary(summary: &SyncSummary) {
    let marker = if summary.is_success() {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!("{} {}", marker, summary.summary());

    if !summary.failed.is_empty() {
        println!();
        println!("{}", style("Failed:").red().bold());
        for (name, error) in &summary.failed {
            println!("  {} {}", style(name).cyan(), style(error).dim());
        }
    }

    if !summary.refresh_failed.is_empty() {
        println!();
        println!("{}", style("Saved, but not refreshed:").yellow().bold());
        for (name, error) in &summary.refresh_failed {
            println!("  {} {}", style(name).cyan(), style(error).dim());
        }
    }
}
