//! Snapshot commands.

use crate::cli::context::{Scope, Session};
use crate::cli::output;
use crate::error::Result;

/// Capture the current variables.
pub fn create(scope: &Scope, name: &str, description: &str) -> Result<()> {
    let session = Session::open(scope)?;
    let snapshot = session.store.create_snapshot(name, description)?;
    output::success(&format!(
        "snapshot {} created ({} variables)",
        name,
        snapshot.len()
    ));
    output::kv("id", &snapshot.id);
    Ok(())
}

/// List snapshots, newest first.
pub fn list(scope: &Scope) -> Result<()> {
    let session = Session::open(scope)?;
    let snapshots = session.store.get_snapshots()?;

    if snapshots.is_empty() {
        output::dimmed("no snapshots");
        return Ok(());
    }

    output::section(&format!("{} snapshots", snapshots.len()));
    for snapshot in snapshots {
        output::list_item(&format!(
            "{}  {}  {} ({} variables)",
            snapshot.id,
            snapshot.created_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.name,
            snapshot.len()
        ));
    }
    Ok(())
}

/// Restore a snapshot.
pub fn restore(scope: &Scope, id: &str) -> Result<()> {
    let session = Session::open(scope)?;
    let backup = session.store.restore_snapshot(id)?;
    output::success(&format!("restored snapshot {}", id));
    output::hint(&format!(
        "undo with: {}",
        output::cmd(&format!("envdeck snapshot restore {}", backup.id))
    ));
    Ok(())
}

/// Delete a snapshot.
pub fn rm(scope: &Scope, id: &str) -> Result<()> {
    let session = Session::open(scope)?;
    session.store.delete_snapshot(id)?;
    output::success(&format!("deleted snapshot {}", id));
    Ok(())
}
