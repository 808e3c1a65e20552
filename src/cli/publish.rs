//! Publish and versions commands.
//!
//! Drafts only live in memory, so one `publish` invocation opens a draft,
//! stages every change given on the command line and publishes it.

use tracing::info;

use crate::cli::context::{Scope, Session};
use crate::cli::output;
use crate::core::domain::{ChangeType, VariableMetadata};
use crate::core::draft::DraftEngine;
use crate::core::validation::parse_assignment;
use crate::error::{DraftError, Error, Result};

/// Stage assignments and deletions, then publish them as one version.
pub fn execute(
    scope: &Scope,
    assignments: &[String],
    deletions: &[String],
    message: Option<String>,
    sensitive: bool,
) -> Result<()> {
    let parsed = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() && deletions.is_empty() {
        return Err(DraftError::NothingToPublish.into());
    }

    let session = Session::open(scope)?;
    let engine = DraftEngine::new(session.store.clone())?;
    engine.create_draft(message, Some(whoami::username()))?;

    for (key, value) in &parsed {
        let change = if session.store.contains(key)? {
            ChangeType::Update
        } else {
            ChangeType::Create
        };
        let metadata = VariableMetadata {
            sensitive: sensitive.then_some(true),
            ..VariableMetadata::default()
        };
        engine.add_variable_to_draft(key, value, metadata, change)?;
    }
    for key in deletions {
        engine.remove_draft_variable(key)?;
    }

    info!(changes = parsed.len() + deletions.len(), "publishing draft");
    let version = engine.publish_draft().map_err(|e| {
        if let Error::Draft(DraftError::PartialPublish {
            applied, failed, ..
        }) = &e
        {
            output::warn(&format!(
                "applied {} change(s) before {} failed",
                applied.len(),
                output::key(failed)
            ));
            for name in applied {
                output::list_item(name);
            }
        }
        e
    })?;

    output::success(&format!("published version {}", version.version));
    for change in &version.changes {
        output::list_item(&format!("{:<6}  {}", change.change_type, change.name));
    }
    Ok(())
}

/// List published versions, newest first.
pub fn versions(scope: &Scope, json: bool) -> Result<()> {
    let session = Session::open(scope)?;
    let engine = DraftEngine::new(session.store.clone())?;
    let versions = engine.get_version_history()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    if versions.is_empty() {
        output::dimmed("no versions published");
        return Ok(());
    }

    output::section(&format!("{} versions", versions.len()));
    for version in versions {
        let author = version.author.as_deref().unwrap_or("unknown");
        output::list_item(&format!(
            "{}  {} change(s)  {}  {}",
            version.version,
            version.changes.len(),
            author,
            version.description
        ));
    }
    Ok(())
}
