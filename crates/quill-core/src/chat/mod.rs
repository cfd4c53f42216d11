//! Chat session orchestration.

pub mod service;

pub use service::{ChatService, SendOutcome};
