//! Input validation for envdeck operations.
//!
//! Validates variable names and `KEY=VALUE` assignments.

use crate::error::{Result, ValidationError};

/// Validate a variable name.
///
/// Names must be valid environment variable names:
/// - Only ASCII letters, digits, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    if let Some((i, ch)) = name
        .chars()
        .enumerate()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: format!(
                "invalid character '{}' at position {}. Only letters, digits, and underscore are allowed",
                ch,
                i + 1
            ),
        }
        .into());
    }

    Ok(())
}

/// Split a `KEY=VALUE` assignment, validating the key.
///
/// The value may be empty and may itself contain `=`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidAssignment` when there is no `=`.
pub fn parse_assignment(input: &str) -> Result<(String, String)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ValidationError::InvalidAssignment(input.to_string()))?;
    let key = key.trim();
    validate_name(key)?;
    Ok((key.to_string(), value.to_string()))
}
