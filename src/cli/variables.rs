//! Variable commands: set, get, rm, list, history.

use tracing::info;

use crate::cli::context::{Scope, Session};
use crate::cli::output;
use crate::core::domain::{HistoryFilter, VariableMetadata};
use crate::error::{Result, StoreError};

/// Set a variable.
pub fn set(
    scope: &Scope,
    key: &str,
    value: &str,
    sensitive: Option<bool>,
    category: Option<String>,
    description: Option<String>,
) -> Result<()> {
    info!(key = %key, "setting variable");
    let session = Session::open(scope)?;
    let metadata = VariableMetadata {
        category,
        description,
        sensitive,
    };
    let saved = session.store.set_variable(key, value, metadata)?;

    let suffix = if saved.sensitive { " (encrypted)" } else { "" };
    output::success(&format!(
        "set {} on {}{}",
        output::key(key),
        saved.branch,
        suffix
    ));
    Ok(())
}

/// Print a variable's value.
pub fn get(scope: &Scope, key: &str) -> Result<()> {
    let session = Session::open(scope)?;
    let variable = session.store.get_variable(key)?;
    // Plain output for scripting
    println!("{}", variable.value);
    Ok(())
}

/// Remove a variable.
pub fn rm(scope: &Scope, key: &str) -> Result<()> {
    let session = Session::open(scope)?;
    if !session.store.delete_variable(key)? {
        return Err(StoreError::VariableNotFound(key.to_string()).into());
    }
    output::success(&format!("removed {}", output::key(key)));
    Ok(())
}

/// List variables on the current branch.
pub fn list(scope: &Scope, json: bool, reveal: bool) -> Result<()> {
    let session = Session::open(scope)?;
    let variables = session.store.get_all_variables()?;

    if json {
        let items: Vec<serde_json::Value> = variables
            .iter()
            .map(|v| {
                serde_json::json!({
                    "name": v.name,
                    "value": if reveal { v.value.as_str() } else { v.display_value() },
                    "category": v.category,
                    "description": v.description,
                    "sensitive": v.sensitive,
                    "updated_at": v.updated_at,
                })
            })
            .collect();
        let result = serde_json::json!({
            "branch": session.store.branch(),
            "variables": items,
            "count": variables.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if variables.is_empty() {
        output::dimmed("no variables stored");
        return Ok(());
    }

    output::section(&format!(
        "{} variables on {}",
        variables.len(),
        session.store.branch()
    ));
    for v in &variables {
        let value = if reveal { v.value.as_str() } else { v.display_value() };
        output::kv(&output::key(&v.name), format!("{}  [{}]", value, v.category));
    }
    Ok(())
}

/// Show history, newest first.
pub fn history(scope: &Scope, key: Option<String>, limit: Option<usize>) -> Result<()> {
    let session = Session::open(scope)?;
    let filter = HistoryFilter { name: key, limit };
    let entries = session.store.get_history(&filter)?;

    if entries.is_empty() {
        output::dimmed("no history");
        return Ok(());
    }

    output::section("History");
    for entry in entries {
        output::list_item(&format!(
            "{}  {:<7}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            output::key(&entry.variable_name)
        ));
    }
    Ok(())
}
