//! Persistence, sync, and chat session logic for Quill.
//!
//! This crate defines the "ports" (`LocalCache`, `RemoteStore`,
//! `ChatProvider`) that the infrastructure layer implements, plus everything
//! built on them: the per-collection storage adapter and sync coordinator,
//! the entity stores, the merge engine, the context window builder, and the
//! chat service. It depends only on `quill-types` -- never on `quill-infra`
//! or any database/IO crate.

pub mod autosave;
pub mod chat;
pub mod context;
pub mod debounce;
pub mod entity;
pub mod llm;
pub mod merge;
pub mod notice;
pub mod storage;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
