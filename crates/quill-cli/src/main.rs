//! Quill CLI entry point.
//!
//! Binary name: `quill`
//!
//! Parses CLI arguments, initializes tracing, opens the local cache and runs
//! the startup reads, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{ChatCommand, Cli, Commands, ConfigCommand, EntryCommand};
use state::{AppState, Overrides};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,quill=debug",
        _ => "trace",
    };
    quill_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "quill", &mut std::io::stdout());
        return Ok(());
    }

    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        deployment: cli.deployment,
    };
    let mut state = AppState::init(overrides).await?;

    let result = dispatch(&mut state, cli.command, cli.json).await;
    quill_observe::tracing_setup::shutdown_tracing();
    result
}

async fn dispatch(state: &mut AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Status => cli::status::status(state, json).await?,

        Commands::Entry { action } => match action {
            EntryCommand::New { date } => cli::entry::new_entry(state, date, json).await?,
            EntryCommand::List { search } => {
                cli::entry::list_entries(state, search.as_deref(), json).await?
            }
            EntryCommand::Show { id } => cli::entry::show_entry(state, &id, json).await?,
            EntryCommand::Save {
                id,
                date,
                title,
                content,
            } => cli::entry::save_entry(state, &id, date, title, content, json).await?,
            EntryCommand::Write { id } => cli::entry::write_entry(state, &id, json).await?,
            EntryCommand::Delete { id, force } => {
                cli::entry::delete_entry(state, &id, force, json).await?
            }
        },

        Commands::Export { output } => cli::journal::export(state, output, json).await?,
        Commands::Import { file, yes } => cli::journal::import(state, &file, yes, json).await?,

        Commands::Chat { action } => match action {
            ChatCommand::New => cli::chat::new_conversation(state, json).await?,
            ChatCommand::List => cli::chat::list_conversations(state, json)?,
            ChatCommand::Show { id } => cli::chat::show_conversation(state, id.as_deref(), json)?,
            ChatCommand::Rename { id, title } => {
                cli::chat::rename_conversation(state, &id, &title, json).await?
            }
            ChatCommand::Delete { id, force } => {
                cli::chat::delete_conversation(state, &id, force, json).await?
            }
            ChatCommand::Send { text, conversation } => {
                cli::chat::send(state, &text, conversation.as_deref(), json).await?
            }
            ChatCommand::Import { file, yes } => {
                cli::chat::import(state, &file, yes, json).await?
            }
            ChatCommand::Export { output } => cli::chat::export(state, output, json).await?,
        },

        Commands::Config { action } => match action {
            ConfigCommand::Show => cli::config::show(state, json)?,
            ConfigCommand::Model { model } => cli::config::set_model(state, model, json).await?,
        },

        // Handled before state init.
        Commands::Completions { .. } => {}
    }
    Ok(())
}
