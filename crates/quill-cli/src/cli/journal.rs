//! Journal backup commands: export and import.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use quill_core::entity::parse_import;

use super::output::{print_notice, warn_remote_failure};
use crate::state::AppState;

pub fn default_backup_name(prefix: &str) -> PathBuf {
    PathBuf::from(format!(
        "{prefix}-{}.json",
        chrono::Local::now().format("%Y-%m-%d")
    ))
}

/// Write every entry to a backup document.
pub async fn export(state: &AppState, output: Option<PathBuf>, json: bool) -> Result<()> {
    let document = state.journal.lock().await.export();
    let path = output.unwrap_or_else(|| default_backup_name("journal-backup"));
    let body = serde_json::to_string_pretty(&document)?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "entries": document.entries.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Exported {} entries to {}",
        style("✓").green().bold(),
        document.entries.len(),
        style(path.display()).cyan()
    );
    println!();
    Ok(())
}

/// Merge entries from a backup document; existing ids win.
pub async fn import(state: &AppState, file: &Path, yes: bool, json: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let incoming = parse_import(&raw)?;

    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Import up to {} entries from {}?",
                incoming.len(),
                style(file.display()).cyan()
            ))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let offered = incoming.len();
    let mut journal = state.journal.lock().await;
    let before = journal.list().len();
    let notice = journal.import(incoming).await?;

    if json {
        let out = serde_json::json!({
            "offered": offered,
            "imported": journal.list().len() - before,
            "total": journal.list().len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_notice(&notice);
    warn_remote_failure(journal.last_write());
    println!();
    Ok(())
}
