//! Change types.
//!
//! Read-only projections describing what a draft or a published version
//! does to the live store.

use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::core::types::VariableName;

/// Kind of change a draft entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    /// Carried in the draft but never applied.
    #[serde(rename = "none")]
    Unchanged,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
            ChangeType::Unchanged => "none",
        };
        f.pad(s)
    }
}

/// One change: `create` omits `old_value`, `delete` omits `new_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableChange {
    pub name: VariableName,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub sensitive: bool,
}

impl VariableChange {
    /// Copy with sensitive values replaced by the mask.
    pub fn masked(&self) -> Self {
        if !self.sensitive {
            return self.clone();
        }
        let mask = |v: &Option<String>| v.as_ref().map(|_| constants::MASKED_VALUE.to_string());
        Self {
            name: self.name.clone(),
            change_type: self.change_type,
            old_value: mask(&self.old_value),
            new_value: mask(&self.new_value),
            sensitive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_sensitive_values() {
        let change = VariableChange {
            name: "TOKEN".to_string(),
            change_type: ChangeType::Update,
            old_value: Some("old".to_string()),
            new_value: Some("new".to_string()),
            sensitive: true,
        };

        let masked = change.masked();
        assert_eq!(masked.old_value.as_deref(), Some(constants::MASKED_VALUE));
        assert_eq!(masked.new_value.as_deref(), Some(constants::MASKED_VALUE));
    }

    #[test]
    fn test_masked_keeps_absent_values_absent() {
        let change = VariableChange {
            name: "TOKEN".to_string(),
            change_type: ChangeType::Create,
            old_value: None,
            new_value: Some("new".to_string()),
            sensitive: true,
        };

        assert_eq!(change.masked().old_value, None);
    }

    #[test]
    fn test_plain_change_untouched() {
        let change = VariableChange {
            name: "PORT".to_string(),
            change_type: ChangeType::Update,
            old_value: Some("80".to_string()),
            new_value: Some("8080".to_string()),
            sensitive: false,
        };

        assert_eq!(change.masked(), change);
    }

    #[test]
    fn test_change_type_serialization() {
        let json = serde_json::to_string(&ChangeType::Unchanged).unwrap();
        assert_eq!(json, "\"none\"");
        let json = serde_json::to_string(&ChangeType::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
    }
}
