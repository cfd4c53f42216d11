//! Chat configuration commands.

use anyhow::Result;
use console::style;
use quill_types::config::ModelId;

use crate::state::AppState;

pub fn show(state: &AppState, json: bool) -> Result<()> {
    let model = state.chat.model();
    let chat = &state.config.chat;

    if json {
        let out = serde_json::json!({
            "model": model,
            "context_messages": chat.context_messages,
            "temperature": chat.temperature,
            "max_tokens": chat.max_tokens,
            "max_stored_messages": chat.max_stored_messages,
            "autosave_debounce_ms": state.config.journal.autosave_debounce_ms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Chat ──").dim());
    println!("  Model:       {}", style(model).cyan());
    println!("  Context:     {} messages", chat.context_messages);
    println!("  Temperature: {}", chat.temperature);
    println!("  Max tokens:  {}", chat.max_tokens);
    println!("  History:     {} messages kept", chat.max_stored_messages);
    println!();
    println!("  {}", style("── Available models ──").dim());
    for candidate in ModelId::ALL {
        let marker = if candidate == model {
            style("●").green()
        } else {
            style("○").dim()
        };
        println!("  {marker} {candidate}");
    }
    println!();
    Ok(())
}

pub async fn set_model(state: &mut AppState, model: ModelId, json: bool) -> Result<()> {
    state.chat.set_model(model).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "model": model }))?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Model set to {}",
        style("✓").green().bold(),
        style(model).cyan()
    );
    println!();
    Ok(())
}
