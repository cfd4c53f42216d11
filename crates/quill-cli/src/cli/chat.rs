//! Chat commands: conversation lifecycle, send, import and export.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use quill_core::chat::SendOutcome;
use quill_core::entity::parse_conversation_import;
use quill_types::chat::{Conversation, MessageRole};
use quill_types::id::EntityId;

use super::journal::default_backup_name;
use super::output::format_relative_time;
use crate::state::AppState;

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

pub async fn new_conversation(state: &mut AppState, json: bool) -> Result<()> {
    let conversation = state.chat.conversations_mut().create().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Started {}",
        style("✓").green().bold(),
        style(&conversation.title).cyan()
    );
    println!("  {}  {}", style("ID:").bold(), style(&conversation.id).dim());
    println!();
    Ok(())
}

pub fn list_conversations(state: &AppState, json: bool) -> Result<()> {
    let conversations = state.chat.conversations();
    let recent = conversations.list_recent();

    if json {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    let active = conversations.active_id();
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for conversation in &recent {
        let title = if Some(&conversation.id) == active {
            Cell::new(format!("● {}", conversation.title)).fg(Color::Green)
        } else {
            Cell::new(&conversation.title)
        };
        table.add_row(vec![
            title,
            Cell::new(conversation.messages.len()),
            Cell::new(format_relative_time(&conversation.updated_at)),
            Cell::new(&conversation.id).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn resolve<'a>(state: &'a AppState, id: Option<&str>) -> Result<&'a Conversation> {
    let conversations = state.chat.conversations();
    match id {
        Some(id) => Ok(conversations.get(&EntityId::from(id))?),
        None => conversations
            .active()
            .context("no active conversation"),
    }
}

pub fn show_conversation(state: &AppState, id: Option<&str>, json: bool) -> Result<()> {
    let conversation = resolve(state, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(conversation)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&conversation.title).cyan().bold());
    println!("  {}", style(&conversation.id).dim());
    println!();
    if conversation.messages.is_empty() {
        println!(
            "  {} No messages yet. Say hello with: {}",
            style("i").blue().bold(),
            style("quill chat send \"...\"").yellow()
        );
        println!();
        return Ok(());
    }
    for message in &conversation.messages {
        let label = match message.role {
            MessageRole::User => style("you").green().bold(),
            MessageRole::Assistant => style("assistant").cyan().bold(),
            MessageRole::System => style("system").dim(),
        };
        println!("  {label}");
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

pub async fn rename_conversation(
    state: &mut AppState,
    id: &str,
    title: &str,
    json: bool,
) -> Result<()> {
    let conversation = state
        .chat
        .conversations_mut()
        .rename(&EntityId::from(id), title)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Renamed to {}",
        style("✓").green().bold(),
        style(&conversation.title).cyan()
    );
    println!();
    Ok(())
}

pub async fn delete_conversation(
    state: &mut AppState,
    id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let id = EntityId::from(id);
    let title = state.chat.conversations().get(&id)?.title.clone();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete conversation '{}'?",
                style(&title).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let conversations = state.chat.conversations_mut();
    conversations.delete(&id).await?;
    let active = conversations.active_id().cloned();

    if json {
        let out = serde_json::json!({ "deleted": id, "active": active });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Deleted conversation '{}'",
        style("✓").green().bold(),
        title
    );
    println!();
    Ok(())
}

/// Check the provider, send `text` and print the assistant's answer.
pub async fn send(
    state: &mut AppState,
    text: &str,
    conversation: Option<&str>,
    json: bool,
) -> Result<()> {
    let target = conversation.map(EntityId::from);

    let progress = (!json).then(|| spinner("Checking provider...")).transpose()?;
    state.chat.refresh_status().await;
    if let Some(progress) = &progress {
        progress.set_message("Thinking...");
    }
    let outcome = state.chat.send(target.as_ref(), text).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let outcome = outcome?;

    if json {
        let out = match &outcome {
            SendOutcome::Replied {
                conversation_id,
                reply,
            } => serde_json::json!({
                "conversation_id": conversation_id,
                "reply": reply.content,
            }),
            SendOutcome::Failed {
                conversation_id,
                error,
                ..
            } => serde_json::json!({
                "conversation_id": conversation_id,
                "error": error.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    match &outcome {
        SendOutcome::Replied { reply, .. } => {
            println!("  {}", style("assistant").cyan().bold());
            for line in reply.content.lines() {
                println!("    {line}");
            }
        }
        SendOutcome::Failed { notice, .. } => {
            println!("  {} {}", style("✗").red().bold(), style(&notice.content).red());
        }
    }
    println!();
    Ok(())
}

pub async fn import(state: &mut AppState, file: &Path, yes: bool, json: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let incoming = parse_conversation_import(&raw)?;

    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Import up to {} conversations from {}?",
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

    let imported = state.chat.conversations_mut().import(incoming).await?;

    if json {
        let out = serde_json::json!({
            "imported": imported,
            "total": state.chat.conversations().list().len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Imported {} {}",
        style("✓").green().bold(),
        imported,
        if imported == 1 { "conversation" } else { "conversations" }
    );
    println!();
    Ok(())
}

pub async fn export(state: &AppState, output: Option<PathBuf>, json: bool) -> Result<()> {
    let document = state.chat.conversations().export();
    let path = output.unwrap_or_else(|| default_backup_name("conversations"));
    let body = serde_json::to_string_pretty(&document)?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "conversations": document.conversations.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Exported {} conversations to {}",
        style("✓").green().bold(),
        document.conversations.len(),
        style(path.display()).cyan()
    );
    println!();
    Ok(())
}
