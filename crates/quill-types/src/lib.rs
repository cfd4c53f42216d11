//! Shared domain types for Quill.
//!
//! This crate contains the domain types used across the Quill workspace:
//! conversations and their messages, journal entries, chat configuration,
//! storage keys, provider wire shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod deployment;
pub mod error;
pub mod id;
pub mod journal;
pub mod llm;
pub mod storage;
