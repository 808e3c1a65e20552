//! Draft types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChangeType, Variable, VariableChange};
use crate::core::types::RecordId;

/// A variable staged in a draft. The value is held as plaintext in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftVariable {
    #[serde(flatten)]
    pub variable: Variable,
    pub is_draft: bool,
    /// Live plaintext value when the entry was added, if the name existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    pub change_type: ChangeType,
}

impl DraftVariable {
    /// Variable name.
    pub fn name(&self) -> &str {
        &self.variable.name
    }

    /// Projection into a change record; `None` for unchanged entries.
    pub fn to_change(&self) -> Option<VariableChange> {
        let (old_value, new_value) = match self.change_type {
            ChangeType::Create => (None, Some(self.variable.value.clone())),
            ChangeType::Update => (
                self.original_value.clone(),
                Some(self.variable.value.clone()),
            ),
            ChangeType::Delete => (self.original_value.clone(), None),
            ChangeType::Unchanged => return None,
        };
        Some(VariableChange {
            name: self.variable.name.clone(),
            change_type: self.change_type,
            old_value,
            new_value,
            sensitive: self.variable.sensitive,
        })
    }
}

/// Partial update merged onto a staged variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
}

impl DraftUpdate {
    /// Update replacing only the value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

/// The single open draft of a store.
///
/// `changes` keeps insertion order; publish applies entries in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSession {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub changes: Vec<DraftVariable>,
}

impl DraftSession {
    /// Staged entry for `name`.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut DraftVariable> {
        self.changes.iter_mut().find(|c| c.name() == name)
    }

    /// Insert or replace the entry for its name, keeping its first position.
    pub(crate) fn upsert(&mut self, entry: DraftVariable) {
        match self.get_mut(entry.name()) {
            Some(existing) => *existing = entry,
            None => self.changes.push(entry),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<DraftVariable> {
        let idx = self.changes.iter().position(|c| c.name() == name)?;
        Some(self.changes.remove(idx))
    }

    /// Changes that publishing would apply, in recorded order.
    pub fn pending_changes(&self) -> Vec<VariableChange> {
        self.changes.iter().filter_map(DraftVariable::to_change).collect()
    }
}
