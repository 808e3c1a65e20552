//! Variable type.
//!
//! A named value scoped to a branch. Sensitive values are stored encrypted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::core::types::{BranchName, StoredValue, VariableName};

/// A stored variable record.
///
/// `(name, branch)` is unique within a store. At rest `encrypted` always
/// equals `sensitive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: VariableName,
    /// Plaintext, or sealed ciphertext when `encrypted` is set.
    pub value: StoredValue,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub sensitive: bool,
    pub encrypted: bool,
    pub branch: BranchName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variable {
    /// Whether this record belongs to `branch`.
    pub fn in_branch(&self, branch: &str) -> bool {
        self.branch == branch
    }

    /// Value safe to print: masked when sensitive.
    pub fn display_value(&self) -> &str {
        if self.sensitive {
            constants::MASKED_VALUE
        } else {
            &self.value
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Optional attributes supplied alongside a value on write.
///
/// Unset fields keep the existing record's attribute when updating, or
/// fall back to defaults when creating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
}

impl VariableMetadata {
    /// Metadata marking the value sensitive.
    pub fn sensitive() -> Self {
        Self {
            sensitive: Some(true),
            ..Self::default()
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
