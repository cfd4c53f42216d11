//! Status dashboard: deployment, sync state per collection, provider.

use anyhow::Result;
use console::style;
use quill_types::storage::{StorageKey, SyncState};

use super::output::format_relative_time;
use crate::state::AppState;

/// Display the status dashboard.
///
/// Checks the provider so the send gate reflects the current proxy state.
pub async fn status(state: &mut AppState, json: bool) -> Result<()> {
    let configured = state.chat.refresh_status().await;
    let gate_message = state.chat.gate().message().to_string();
    let checked_at = state.chat.gate().checked_at();

    let (entry_count, journal_sync) = {
        let journal = state.journal.lock().await;
        (journal.list().len(), journal.sync_state())
    };
    let conversations = state.chat.conversations();
    let conversation_count = conversations.list().len();
    let conversation_sync = conversations.sync_state();
    let journal_updated = state.cache.updated_at(StorageKey::JournalEntries).await?;
    let chat_updated = state.cache.updated_at(StorageKey::Conversations).await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "deployment": state.mode,
            "base_url": state.config.remote.base_url,
            "journal": {
                "entries": entry_count,
                "sync": journal_sync.to_string(),
                "source": state.journal_source.to_string(),
                "updated_at": journal_updated,
            },
            "conversations": {
                "count": conversation_count,
                "sync": conversation_sync.to_string(),
                "updated_at": chat_updated,
            },
            "provider": {
                "model": state.chat.model(),
                "configured": configured,
                "message": gate_message,
                "checked_at": checked_at,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let sync_label = |sync: SyncState| match sync {
        SyncState::RemoteBacked => style(sync.to_string()).green(),
        SyncState::LocalOnly => style(sync.to_string()).yellow(),
    };

    println!();
    println!(
        "  {} Quill v{}",
        style("✎").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Journal ──").dim());
    println!("  Entries:  {}", style(entry_count).bold());
    println!("  Sync:     {}", sync_label(journal_sync));
    println!("  Loaded:   {}", state.journal_source);
    println!();

    println!("  {}", style("── Conversations ──").dim());
    println!("  Count:    {}", style(conversation_count).bold());
    println!("  Sync:     {}", sync_label(conversation_sync));
    println!();

    println!("  {}", style("── Provider ──").dim());
    println!("  Model:    {}", style(state.chat.model()).cyan());
    let check = if configured {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("  {} {}", check, gate_message);
    if let Some(checked_at) = checked_at {
        println!(
            "  Checked:  {}",
            style(format_relative_time(&checked_at)).dim()
        );
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Mode:     {}", state.mode);
    println!("  Remote:   {}", style(&state.config.remote.base_url).dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
