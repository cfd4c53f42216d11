//! Debounced, silent auto-save of the journal editor.

use std::sync::Arc;
use std::time::Duration;

use quill_types::error::EntityError;
use quill_types::id::EntityId;
use quill_types::journal::{JournalPatch, SaveKind};
use tokio::sync::Mutex;

use crate::debounce::Debouncer;
use crate::entity::JournalStore;
use crate::storage::{LocalCache, RemoteStore};

/// Latest editor state waiting to be saved.
#[derive(Debug, Clone)]
struct PendingSave {
    id: EntityId,
    patch: JournalPatch,
}

/// Collects editor input and persists only the last state after a quiet
/// period, through the silent save variant.
pub struct AutoSaver<L, R> {
    store: Arc<Mutex<JournalStore<L, R>>>,
    pending: Arc<Mutex<Option<PendingSave>>>,
    debouncer: Debouncer,
}

impl<L, R> AutoSaver<L, R>
where
    L: LocalCache + 'static,
    R: RemoteStore + 'static,
{
    pub fn new(store: Arc<Mutex<JournalStore<L, R>>>, delay: Duration) -> Self {
        Self {
            store,
            pending: Arc::new(Mutex::new(None)),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Record an input event carrying the editor's current state for `id`.
    pub async fn on_input(&mut self, id: EntityId, patch: JournalPatch) {
        *self.pending.lock().await = Some(PendingSave { id, patch });

        let store = self.store.clone();
        let pending = self.pending.clone();
        self.debouncer.schedule(async move {
            // Held until the save completes, so `flush` waits for it.
            let mut slot = pending.lock().await;
            let Some(save) = slot.take() else {
                return;
            };
            if let Err(e) = run_save(&store, save).await {
                tracing::warn!(error = %e, "Auto-save failed");
            }
        });
    }

    /// Cancel the timer and save any pending state now. Returns true if
    /// something was saved. A timed save already running finishes first.
    pub async fn flush(&mut self) -> Result<bool, EntityError> {
        self.debouncer.cancel();
        let Some(save) = self.pending.lock().await.take() else {
            return Ok(false);
        };
        run_save(&self.store, save).await?;
        Ok(true)
    }

    /// Drop pending state without saving.
    pub async fn discard(&mut self) {
        self.debouncer.cancel();
        self.pending.lock().await.take();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

async fn run_save<L: LocalCache, R: RemoteStore>(
    store: &Mutex<JournalStore<L, R>>,
    save: PendingSave,
) -> Result<(), EntityError> {
    let mut store = store.lock().await;
    match store.update(&save.id, save.patch, SaveKind::Auto).await {
        Ok(_) => Ok(()),
        // The entry was deleted while the timer was pending.
        Err(e) if e.is_not_found() => {
            tracing::debug!(id = %save.id, "Auto-save target no longer exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
