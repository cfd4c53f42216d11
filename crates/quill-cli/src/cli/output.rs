//! Shared styled-output helpers.

use console::style;
use quill_core::notice::Notice;
use quill_core::storage::{RemoteWrite, WriteReport};

/// Print a success notice, e.g. "✓ Entry saved".
pub fn print_notice(notice: &Notice) {
    println!();
    println!("  {} {}", style("✓").green().bold(), notice);
}

/// Warn when the last write only reached the local cache.
pub fn warn_remote_failure(report: Option<&WriteReport>) {
    if let Some(WriteReport {
        remote: RemoteWrite::Failed(e),
    }) = report
    {
        println!(
            "  {} Saved locally; remote store failed: {}",
            style("!").yellow().bold(),
            style(e).dim()
        );
    }
}

pub fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// First line of `text`, cut to `max` characters with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
