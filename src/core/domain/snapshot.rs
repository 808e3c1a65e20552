//! Snapshot type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Variable;
use crate::core::types::RecordId;

/// A point-in-time full copy of every variable record, all branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub variables: Vec<Variable>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Number of records captured.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the snapshot captured nothing.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
