//! Infrastructure layer for Quill.
//!
//! Implements the ports defined in `quill-core`: the SQLite local cache,
//! the HTTP remote store, and the chat provider proxy client. Also owns
//! data-directory resolution and `config.toml` loading.

pub mod config;
pub mod filesystem;
pub mod http;
pub mod sqlite;
