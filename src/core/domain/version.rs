//! Version type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VariableChange;
use crate::core::types::RecordId;

/// Immutable record of one successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: RecordId,
    /// Sortable label, e.g. `20261015.143005.042`.
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Live variable count on the store's branch after publishing.
    pub variable_count: usize,
    pub changes: Vec<VariableChange>,
    pub published: bool,
}

impl std::fmt::Display for VersionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} changes)", self.version, self.changes.len())
    }
}
