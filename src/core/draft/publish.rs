//! Publishing.
//!
//! Entries are applied in staging order through the store's own
//! mutations. There is no rollback: if an entry fails, the entries before
//! it stay applied and the draft keeps only what is left.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::DraftEngine;
use crate::core::domain::{ChangeType, DraftVariable, VariableMetadata, VersionEntry};
use crate::core::notifier::{ChangeKind, ReloadEvent};
use crate::error::{DraftError, Result};

impl DraftEngine {
    /// Apply the open draft to the live store and record a version.
    ///
    /// # Returns
    ///
    /// The new version entry. Sensitive values in its changes are masked.
    ///
    /// # Errors
    ///
    /// - `DraftError::NothingToPublish` without an open draft or with no
    ///   applicable entries.
    /// - `DraftError::PartialPublish` if an entry failed after at least one
    ///   other was applied. The draft then holds only the unapplied entries.
    /// - The entry's own error if the very first entry failed, with the
    ///   draft left as it was.
    pub fn publish_draft(&self) -> Result<VersionEntry> {
        self.store.credentials().require()?;

        let mut slot = self.draft.lock();
        let Some(session) = slot.as_ref().cloned() else {
            return Err(DraftError::NothingToPublish.into());
        };
        let changes = session.pending_changes();
        if changes.is_empty() {
            return Err(DraftError::NothingToPublish.into());
        }

        let mut applied: Vec<String> = Vec::new();
        for entry in &session.changes {
            if entry.change_type == ChangeType::Unchanged {
                continue;
            }
            if let Err(e) = self.apply(entry) {
                if applied.is_empty() {
                    return Err(e);
                }
                warn!(failed = %entry.name(), applied = applied.len(), error = %e, "publish stopped");
                let failed = entry.name().to_string();
                if let Some(open) = slot.as_mut() {
                    open.changes.retain(|c| !applied.iter().any(|a| a == c.name()));
                }
                return Err(DraftError::PartialPublish {
                    applied,
                    failed,
                    source: Box::new(e),
                }
                .into());
            }
            applied.push(entry.name().to_string());
        }

        let now = Utc::now();
        let version = VersionEntry {
            id: Uuid::new_v4().to_string(),
            version: self.versions.next_label(now),
            description: session.description.clone().unwrap_or_default(),
            author: session.author.clone(),
            timestamp: now,
            variable_count: self.store.variable_count()?,
            changes: changes.iter().map(|c| c.masked()).collect(),
            published: true,
        };
        self.versions.append(version.clone())?;
        *slot = None;
        drop(slot);

        info!(
            version = %version.version,
            changes = version.changes.len(),
            variables = version.variable_count,
            "draft published"
        );
        self.store.emit(
            ReloadEvent::new(ChangeKind::DraftPublished)
                .with_variables(applied)
                .with_version(version.version.clone()),
        );
        Ok(version)
    }

    fn apply(&self, entry: &DraftVariable) -> Result<()> {
        let variable = &entry.variable;
        match entry.change_type {
            ChangeType::Create | ChangeType::Update => {
                let metadata = VariableMetadata {
                    category: Some(variable.category.clone()),
                    description: Some(variable.description.clone()),
                    sensitive: Some(variable.sensitive),
                };
                self.store
                    .set_variable(&variable.name, &variable.value, metadata)
                    .map(|_| ())
            }
            ChangeType::Delete => self.store.delete_variable(&variable.name).map(|_| ()),
            ChangeType::Unchanged => Ok(()),
        }
    }
}
