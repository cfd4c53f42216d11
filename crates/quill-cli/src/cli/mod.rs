//! CLI command definitions for the `quill` binary.
//!
//! Uses clap derive macros. Commands are grouped by collection:
//! `quill entry ...` for the journal, `quill chat ...` for conversations.

pub mod chat;
pub mod config;
pub mod entry;
pub mod journal;
pub mod output;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use quill_types::config::ModelId;
use quill_types::deployment::DeploymentSetting;

/// Journal with an AI writing assistant.
#[derive(Parser)]
#[command(name = "quill", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans as OpenTelemetry traces to stdout.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Base URL of the remote store and provider proxy.
    #[arg(long, global = true, env = "QUILL_BASE_URL")]
    pub base_url: Option<String>,

    /// Deployment mode: auto, local or hosted.
    #[arg(long, global = true)]
    pub deployment: Option<DeploymentSetting>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Storage, sync and provider status.
    Status,

    /// Journal entries.
    Entry {
        #[command(subcommand)]
        action: EntryCommand,
    },

    /// Write every journal entry to a backup file.
    Export {
        /// Output file. Defaults to journal-backup-YYYY-MM-DD.json.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge entries from a backup file into the journal.
    Import {
        /// Backup file to read.
        file: PathBuf,

        /// Skip confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Conversations with the writing assistant.
    Chat {
        #[command(subcommand)]
        action: ChatCommand,
    },

    /// Chat configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum EntryCommand {
    /// Create a new entry and make it active.
    New {
        /// Entry date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List entries, newest date first.
    #[command(alias = "ls")]
    List {
        /// Only entries whose title or body contains this keyword.
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show one entry.
    Show {
        /// Entry ID.
        id: String,
    },

    /// Save fields of an entry.
    Save {
        /// Entry ID.
        id: String,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Write an entry's body from stdin, auto-saving as you go.
    Write {
        /// Entry ID.
        id: String,
    },

    /// Delete an entry.
    #[command(alias = "rm")]
    Delete {
        /// Entry ID.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ChatCommand {
    /// Start a new conversation.
    New,

    /// List conversations, most recently updated first.
    #[command(alias = "ls")]
    List,

    /// Show a conversation's messages. Defaults to the active one.
    Show {
        /// Conversation ID.
        id: Option<String>,
    },

    /// Rename a conversation.
    Rename {
        /// Conversation ID.
        id: String,

        /// New title.
        title: String,
    },

    /// Delete a conversation.
    #[command(alias = "rm")]
    Delete {
        /// Conversation ID.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Send a message and print the reply.
    Send {
        /// Message text.
        text: String,

        /// Conversation to send in. Defaults to the active one.
        #[arg(long, short)]
        conversation: Option<String>,
    },

    /// Merge conversations from an export file.
    Import {
        /// Export file to read.
        file: PathBuf,

        /// Skip confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write every conversation to an export file.
    Export {
        /// Output file. Defaults to conversations-YYYY-MM-DD.json.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the chat configuration.
    Show,

    /// Select the chat model.
    Model {
        /// One of: qwen-turbo, qwen-plus, qwen-max, deepseek-chat, deepseek-reasoner.
        model: ModelId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_entry_save() {
        let cli = Cli::try_parse_from([
            "quill", "entry", "save", "abc", "--title", "Walk", "--date", "2024-03-01",
        ])
        .unwrap();
        let Commands::Entry {
            action: EntryCommand::Save { id, date, title, content },
        } = cli.command
        else {
            panic!("expected entry save");
        };
        assert_eq!(id, "abc");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(title.as_deref(), Some("Walk"));
        assert!(content.is_none());
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "quill",
            "chat",
            "send",
            "hello",
            "--deployment",
            "hosted",
            "--base-url",
            "https://journal.example.com",
        ])
        .unwrap();
        assert_eq!(cli.deployment, Some(DeploymentSetting::Hosted));
        assert_eq!(cli.base_url.as_deref(), Some("https://journal.example.com"));
    }

    #[test]
    fn test_parse_model_rejects_unknown() {
        assert!(Cli::try_parse_from(["quill", "config", "model", "gpt-4"]).is_err());
        assert!(Cli::try_parse_from(["quill", "config", "model", "qwen-max"]).is_ok());
    }
}
