//! History types.
//!
//! Append-only audit trail of variable mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{BranchName, RecordId, StoredValue, VariableName};

/// What happened to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    Restore,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::Create => "create",
            HistoryAction::Update => "update",
            HistoryAction::Delete => "delete",
            HistoryAction::Restore => "restore",
        };
        f.pad(s)
    }
}

/// One immutable history record.
///
/// Values are captured as stored, so sensitive values appear as ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub action: HistoryAction,
    /// Variable name, or the snapshot name for `restore`.
    pub variable_name: VariableName,
    pub branch: BranchName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<StoredValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<StoredValue>,
    pub timestamp: DateTime<Utc>,
}

/// History query options.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only entries for this variable.
    pub name: Option<String>,
    /// At most this many entries.
    pub limit: Option<usize>,
}

impl HistoryFilter {
    /// Entries for one variable.
    pub fn for_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            limit: None,
        }
    }

    pub(crate) fn matches(&self, entry: &HistoryEntry) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| entry.variable_name == name)
    }
}
