//! User-visible success signals raised by store mutations.

use std::fmt;

use quill_types::id::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    EntryCreated(EntityId),
    EntrySaved(EntityId),
    EntryDeleted(EntityId),
    EntriesImported(usize),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EntryCreated(_) => write!(f, "New entry created"),
            Notice::EntrySaved(_) => write!(f, "Entry saved"),
            Notice::EntryDeleted(_) => write!(f, "Entry deleted"),
            Notice::EntriesImported(1) => write!(f, "Imported 1 entry"),
            Notice::EntriesImported(n) => write!(f, "Imported {n} entries"),
        }
    }
}
