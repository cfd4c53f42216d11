//! Merge-by-id for imports.
//!
//! Existing entities always win. Incoming entities are appended in order
//! when their id is new, so re-importing the same document is a no-op.

use std::collections::HashSet;

use quill_types::id::EntityId;

use crate::entity::Entity;

/// Append every incoming entity whose id is not already present.
///
/// Duplicate ids inside `incoming` resolve first-seen-wins as well, so the
/// collection never ends up with two entities sharing an id. Returns the
/// number of entities added.
pub fn merge_by_id<E: Entity>(existing: &mut Vec<E>, incoming: Vec<E>) -> usize {
    let mut seen: HashSet<EntityId> = existing.iter().map(|e| e.id().clone()).collect();
    let before = existing.len();
    for item in incoming {
        if seen.insert(item.id().clone()) {
            existing.push(item);
        }
    }
    existing.len() - before
}
