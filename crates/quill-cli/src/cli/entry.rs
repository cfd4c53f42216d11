//! Journal entry commands: new, list, show, save, write, delete.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use quill_core::notice::Notice;
use quill_types::id::EntityId;
use quill_types::journal::{JournalEntry, JournalPatch, SaveKind};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::output::{format_relative_time, preview, print_notice, warn_remote_failure};
use crate::state::AppState;

/// Create an entry dated `date` (today by default) and make it active.
pub async fn new_entry(state: &AppState, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let mut journal = state.journal.lock().await;
    let entry = match date {
        Some(date) => journal.create(date).await?,
        None => journal.create_today().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    print_notice(&Notice::EntryCreated(entry.id.clone()));
    warn_remote_failure(journal.last_write());
    println!();
    println!("  {}  {}", style("ID:").bold(), style(&entry.id).dim());
    println!("  {}  {}", style("Date:").bold(), entry.date);
    println!();
    println!(
        "  Write it: {}",
        style(format!("quill entry write {}", entry.id)).yellow()
    );
    println!();
    Ok(())
}

/// List entries by date, or the ones matching `search`.
pub async fn list_entries(state: &AppState, search: Option<&str>, json: bool) -> Result<()> {
    let journal = state.journal.lock().await;
    let entries = match search {
        Some(keyword) => journal.search(keyword),
        None => journal.list_by_date(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        match search {
            Some(keyword) => println!(
                "  {} No entries match '{}'.",
                style("i").blue().bold(),
                keyword
            ),
            None => println!(
                "  {} No entries yet. Create one with: {}",
                style("i").blue().bold(),
                style("quill entry new").yellow()
            ),
        }
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Date").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Preview").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    let active = journal.active().map(|e| e.id.clone());
    for entry in &entries {
        let title = if Some(&entry.id) == active.as_ref() {
            Cell::new(format!("● {}", entry.title)).fg(Color::Green)
        } else {
            Cell::new(&entry.title)
        };
        table.add_row(vec![
            Cell::new(entry.date),
            title,
            Cell::new(preview(&entry.content, 40)).fg(Color::DarkGrey),
            Cell::new(format_relative_time(&entry.updated_at)),
            Cell::new(&entry.id).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} {}",
        style(entries.len()).bold(),
        if entries.len() == 1 { "entry" } else { "entries" }
    );
    println!();
    Ok(())
}

pub async fn show_entry(state: &AppState, id: &str, json: bool) -> Result<()> {
    let journal = state.journal.lock().await;
    let entry = journal.get(&EntityId::from(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    print_entry(entry);
    Ok(())
}

fn print_entry(entry: &JournalEntry) {
    println!();
    println!("  {}", style(&entry.title).cyan().bold());
    println!(
        "  {}  {}",
        style(entry.date).bold(),
        style(format!("updated {}", format_relative_time(&entry.updated_at))).dim()
    );
    println!();
    if entry.content.is_empty() {
        println!("  {}", style("(empty)").dim());
    } else {
        for line in entry.content.lines() {
            println!("  {line}");
        }
    }
    println!();
}

/// Explicit save of the given fields.
pub async fn save_entry(
    state: &AppState,
    id: &str,
    date: Option<NaiveDate>,
    title: Option<String>,
    content: Option<String>,
    json: bool,
) -> Result<()> {
    let patch = JournalPatch {
        date,
        title,
        content,
    };
    if patch == JournalPatch::default() {
        bail!("nothing to save: pass --date, --title or --content");
    }

    let id = EntityId::from(id);
    let mut journal = state.journal.lock().await;
    let notice = journal.update(&id, patch, SaveKind::Explicit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(journal.get(&id)?)?);
        return Ok(());
    }

    if let Some(notice) = notice {
        print_notice(&notice);
    }
    warn_remote_failure(journal.last_write());
    println!();
    Ok(())
}

/// Replace an entry's body with stdin, auto-saving after each pause.
///
/// Every line read is an input event carrying the body so far. Reaching
/// end of input flushes whatever is still pending.
pub async fn write_entry(state: &AppState, id: &str, json: bool) -> Result<()> {
    let id = EntityId::from(id);
    {
        let mut journal = state.journal.lock().await;
        journal.set_active(&id)?;
    }

    if !json {
        println!();
        println!(
            "  {} Writing to entry {}. End input with Ctrl-D.",
            style("✎").cyan(),
            style(&id).dim()
        );
        println!();
    }

    let mut saver = state.auto_saver();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut body = String::new();
    while let Some(line) = lines.next_line().await? {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&line);
        let patch = JournalPatch {
            content: Some(body.clone()),
            ..Default::default()
        };
        saver.on_input(id.clone(), patch).await;
    }
    saver.flush().await?;

    let journal = state.journal.lock().await;
    let entry = journal.get(&id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    // Auto-saves raise no notice; report the final state only.
    println!(
        "  {} {} characters written",
        style("✓").green().bold(),
        entry.content.chars().count()
    );
    warn_remote_failure(journal.last_write());
    println!();
    Ok(())
}

pub async fn delete_entry(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let id = EntityId::from(id);
    let mut journal = state.journal.lock().await;
    let title = journal.get(&id)?.title.clone();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete entry '{}'?",
                style(&title).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let notice = journal.delete(&id).await?;

    if json {
        let out = serde_json::json!({ "deleted": id, "title": title });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_notice(&notice);
    warn_remote_failure(journal.last_write());
    println!();
    Ok(())
}
