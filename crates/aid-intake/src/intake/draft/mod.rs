//! Durable, best-effort storage of the in-progress application.

mod store;

pub use store::{DraftStore, FileDraftStore, MemoryDraftStore, PersistenceError};

use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::{ApplicationDraft, StepAnswers};

/// Versioned key under which the draft blob is stored.
pub const DRAFT_STORAGE_KEY: &str = "app.form.data.v1";

/// Sole owner of the [`ApplicationDraft`]. Storage failures are logged and
/// swallowed; the in-memory draft stays authoritative for the session.
pub struct FormState {
    store: Arc<dyn DraftStore>,
    key: String,
    draft: ApplicationDraft,
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("key", &self.key)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl FormState {
    /// Restore the draft stored under [`DRAFT_STORAGE_KEY`].
    pub fn restore(store: Arc<dyn DraftStore>) -> Self {
        Self::restore_with_key(store, DRAFT_STORAGE_KEY)
    }

    pub fn restore_with_key(store: Arc<dyn DraftStore>, key: impl Into<String>) -> Self {
        let mut state = Self {
            store,
            key: key.into(),
            draft: ApplicationDraft::default(),
        };
        state.draft = state.load();
        state
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    /// Read the stored draft. Missing or undecodable blobs read as empty.
    pub fn load(&self) -> ApplicationDraft {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ApplicationDraft::default(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "draft read failed; starting empty");
                return ApplicationDraft::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored draft is corrupt; starting empty");
                ApplicationDraft::default()
            }
        }
    }

    pub fn save(&self, draft: &ApplicationDraft) {
        if let Err(err) = self.try_save(draft) {
            warn!(key = %self.key, error = %err, "draft save failed; continuing in memory");
        }
    }

    fn try_save(&self, draft: &ApplicationDraft) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(draft)?;
        self.store.write(&self.key, &encoded)
    }

    /// Replace one step of the draft and persist the result.
    pub fn merge(&mut self, answers: StepAnswers) {
        answers.apply(&mut self.draft);
        self.save(&self.draft);
        debug!(key = %self.key, "draft merged");
    }

    /// Drop the stored blob and reset the in-memory draft.
    pub fn clear(&mut self) {
        if let Err(err) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %err, "draft removal failed");
        }
        self.draft = ApplicationDraft::default();
    }
}
