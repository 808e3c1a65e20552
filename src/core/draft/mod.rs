//! Draft engine.
//!
//! Stages a batch of variable changes over a [`VariableStore`] and
//! publishes them as one numbered version.
//!
//! ```text
//! NoDraft ──create_draft──▶ DraftOpen ──publish_draft──▶ NoDraft
//!                              │  ▲                         (version appended)
//!                              │  └── create_draft replaces the open draft
//!                              └──discard_draft──▶ NoDraft
//! ```
//!
//! The draft lives only in memory. Staging never touches the live store;
//! publishing writes through it one entry at a time.

mod publish;
mod versions;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::constants;
use crate::core::domain::{
    ChangeType, DraftSession, DraftUpdate, DraftVariable, Variable, VariableChange,
    VariableMetadata, VersionEntry,
};
use crate::core::store::VariableStore;
use crate::core::validation::validate_name;
use crate::error::{DraftError, Result};

use versions::VersionLog;

/// Single-slot draft state machine over one store.
pub struct DraftEngine {
    store: Arc<VariableStore>,
    draft: Mutex<Option<DraftSession>>,
    versions: VersionLog,
}

impl std::fmt::Debug for DraftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftEngine")
            .field("store", &self.store)
            .field("has_draft", &self.draft.lock().is_some())
            .finish()
    }
}

impl DraftEngine {
    /// Engine over `store`, loading the project's version history.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if the version file cannot be parsed.
    pub fn new(store: Arc<VariableStore>) -> Result<Self> {
        let versions = VersionLog::open(store.data_dir())?;
        Ok(Self {
            store,
            draft: Mutex::new(None),
            versions,
        })
    }

    /// The store this engine publishes into.
    pub fn store(&self) -> &Arc<VariableStore> {
        &self.store
    }

    /// Open a new, empty draft. An open draft is replaced without merging.
    pub fn create_draft(
        &self,
        description: Option<String>,
        author: Option<String>,
    ) -> Result<DraftSession> {
        self.store.credentials().require()?;

        let session = DraftSession {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            description,
            author,
            changes: Vec::new(),
        };
        let replaced = self.draft.lock().replace(session.clone());
        if let Some(old) = replaced {
            info!(id = %old.id, entries = old.changes.len(), "open draft replaced");
        }
        debug!(id = %session.id, "draft created");
        Ok(session)
    }

    /// Whether a draft is open.
    pub fn has_draft(&self) -> Result<bool> {
        self.store.credentials().require()?;
        Ok(self.draft.lock().is_some())
    }

    /// Copy of the open draft, if any.
    pub fn current_draft(&self) -> Result<Option<DraftSession>> {
        self.store.credentials().require()?;
        Ok(self.draft.lock().clone())
    }

    /// Stage a change for `name`, replacing any earlier entry for it.
    ///
    /// The live plaintext value at this moment is kept as the entry's
    /// original value. Attributes not given in `metadata` come from the
    /// live record, then from defaults.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::NoActiveDraft` without an open draft.
    pub fn add_variable_to_draft(
        &self,
        name: &str,
        value: &str,
        metadata: VariableMetadata,
        change_type: ChangeType,
    ) -> Result<DraftVariable> {
        validate_name(name)?;
        let mut slot = self.draft.lock();
        let session = slot.as_mut().ok_or(DraftError::NoActiveDraft)?;

        let live = self.store.find_variable(name)?;
        let now = Utc::now();
        let sensitive = metadata
            .sensitive
            .or(live.as_ref().map(|v| v.sensitive))
            .unwrap_or(false);

        let entry = DraftVariable {
            variable: Variable {
                name: name.to_string(),
                value: value.to_string(),
                category: metadata
                    .category
                    .or_else(|| live.as_ref().map(|v| v.category.clone()))
                    .unwrap_or_else(|| constants::DEFAULT_CATEGORY.to_string()),
                description: metadata
                    .description
                    .or_else(|| live.as_ref().map(|v| v.description.clone()))
                    .unwrap_or_default(),
                sensitive,
                encrypted: false,
                branch: self.store.branch().to_string(),
                created_at: live.as_ref().map_or(now, |v| v.created_at),
                updated_at: now,
            },
            is_draft: true,
            original_value: live.map(|v| v.value),
            change_type,
        };

        debug!(name = %name, change = %change_type, "staged");
        session.upsert(entry.clone());
        Ok(entry)
    }

    /// Merge `updates` onto a staged entry.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::NotInDraft` if `name` has no staged entry.
    pub fn update_draft_variable(&self, name: &str, updates: DraftUpdate) -> Result<DraftVariable> {
        self.store.credentials().require()?;
        let mut slot = self.draft.lock();
        let session = slot.as_mut().ok_or(DraftError::NoActiveDraft)?;
        let entry = session
            .get_mut(name)
            .ok_or_else(|| DraftError::NotInDraft(name.to_string()))?;

        let variable = &mut entry.variable;
        if let Some(value) = updates.value {
            variable.value = value;
        }
        if let Some(category) = updates.category {
            variable.category = category;
        }
        if let Some(description) = updates.description {
            variable.description = description;
        }
        if let Some(sensitive) = updates.sensitive {
            variable.sensitive = sensitive;
        }
        variable.updated_at = Utc::now();

        debug!(name = %name, "draft entry updated");
        Ok(entry.clone())
    }

    /// Stage the removal of `name`.
    ///
    /// A live variable gets a `delete` entry. A name that only exists in
    /// the draft is dropped from it, leaving no trace at publish time.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::NotInDraft` if the name is neither live nor
    /// staged.
    pub fn remove_draft_variable(&self, name: &str) -> Result<()> {
        let mut slot = self.draft.lock();
        let session = slot.as_mut().ok_or(DraftError::NoActiveDraft)?;

        match self.store.find_variable(name)? {
            Some(live) => {
                let entry = DraftVariable {
                    original_value: Some(live.value.clone()),
                    variable: Variable {
                        updated_at: Utc::now(),
                        ..live
                    },
                    is_draft: true,
                    change_type: ChangeType::Delete,
                };
                session.upsert(entry);
                debug!(name = %name, "staged delete");
            }
            None => {
                session
                    .remove(name)
                    .ok_or_else(|| DraftError::NotInDraft(name.to_string()))?;
                debug!(name = %name, "dropped draft-only entry");
            }
        }
        Ok(())
    }

    /// Changes the open draft would apply, in staging order.
    pub fn get_draft_changes(&self) -> Result<Vec<VariableChange>> {
        self.store.credentials().require()?;
        let slot = self.draft.lock();
        let session = slot.as_ref().ok_or(DraftError::NoActiveDraft)?;
        Ok(session.pending_changes())
    }

    /// Drop the open draft. The live store is not touched.
    pub fn discard_draft(&self) -> Result<()> {
        self.store.credentials().require()?;
        let session = self.draft.lock().take().ok_or(DraftError::NoActiveDraft)?;
        info!(id = %session.id, entries = session.changes.len(), "draft discarded");
        Ok(())
    }

    /// Published versions, newest first.
    pub fn get_version_history(&self) -> Result<Vec<VersionEntry>> {
        self.store.credentials().require()?;
        Ok(self.versions.newest_first())
    }

    /// One published version, by id or label.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::VersionNotFound` for an unknown id.
    pub fn get_version(&self, id: &str) -> Result<VersionEntry> {
        self.store.credentials().require()?;
        self.versions.find(id)
    }
}
