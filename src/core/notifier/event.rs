//! Change events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{BranchName, VariableName};

/// What kind of committed mutation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    VariableSet,
    VariableDeleted,
    SnapshotRestored,
    DraftPublished,
    PasswordChanged,
    Manual,
}

impl ChangeKind {
    /// Wire name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::VariableSet => "variable_set",
            ChangeKind::VariableDeleted => "variable_deleted",
            ChangeKind::SnapshotRestored => "snapshot_restored",
            ChangeKind::DraftPublished => "draft_published",
            ChangeKind::PasswordChanged => "password_changed",
            ChangeKind::Manual => "manual",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload describing one change, broadcast with every reload message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadEvent {
    pub kind: ChangeKind,
    #[serde(default)]
    pub variables: Vec<VariableName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ReloadEvent {
    /// New event stamped now.
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            variables: Vec::new(),
            branch: None,
            version: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach affected variable names.
    pub fn with_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<VariableName>,
    {
        self.variables = names.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the branch the change applied to.
    pub fn with_branch(mut self, branch: impl Into<BranchName>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Attach the published version label.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Receiver of committed-change signals.
///
/// Implementations must not block: the store calls this while the caller
/// waits for its mutation to return.
pub trait ChangeSink: Send + Sync {
    fn notify(&self, event: ReloadEvent);
}
