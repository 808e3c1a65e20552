//! Snapshot operations.
//!
//! Snapshots copy every record of every branch as stored, so sensitive
//! values stay ciphertext inside them.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::variables::history_entry;
use super::{StoreData, VariableStore};
use crate::core::domain::{HistoryAction, Snapshot};
use crate::core::notifier::{ChangeKind, ReloadEvent};
use crate::error::{Result, StoreError};

const BACKUP_PREFIX: &str = "Backup before restoring";

impl VariableStore {
    /// Capture the current variable set.
    pub fn create_snapshot(&self, name: &str, description: &str) -> Result<Snapshot> {
        let snapshot = self.mutate(|data, _| Ok(push_snapshot(data, name, description)))?;
        info!(id = %snapshot.id, name = %name, variables = snapshot.len(), "snapshot created");
        Ok(snapshot)
    }

    /// All snapshots, newest first.
    pub fn get_snapshots(&self) -> Result<Vec<Snapshot>> {
        self.read(|data, _| data.snapshots.iter().rev().cloned().collect())
    }

    /// Replace the live variable set with a snapshot's copy.
    ///
    /// A backup snapshot of the current state is taken first, so every
    /// restore can itself be undone. Backup, replacement and the `restore`
    /// history entry are persisted together.
    ///
    /// # Returns
    ///
    /// The backup snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SnapshotNotFound` for an unknown id.
    pub fn restore_snapshot(&self, id: &str) -> Result<Snapshot> {
        let branch = self.branch.clone();
        let (backup, source) = self.mutate(|data, _| {
            let source = data
                .snapshots
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| StoreError::SnapshotNotFound(id.to_string()))?;

            let backup = push_snapshot(
                data,
                &format!("{} {}", BACKUP_PREFIX, source.name),
                &format!("Automatic backup taken before restoring snapshot {}", source.id),
            );
            data.variables = source.variables.clone();
            data.history.push(history_entry(
                HistoryAction::Restore,
                &source.name,
                &branch,
                None,
                None,
            ));
            Ok((backup, source))
        })?;

        info!(id = %source.id, name = %source.name, backup = %backup.id, "snapshot restored");
        let names = source
            .variables
            .iter()
            .filter(|v| v.in_branch(&self.branch))
            .map(|v| v.name.clone());
        self.emit(ReloadEvent::new(ChangeKind::SnapshotRestored).with_variables(names));
        Ok(backup)
    }

    /// Delete a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SnapshotNotFound` for an unknown id.
    pub fn delete_snapshot(&self, id: &str) -> Result<()> {
        self.mutate(|data, _| {
            let idx = data
                .snapshots
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| StoreError::SnapshotNotFound(id.to_string()))?;
            data.snapshots.remove(idx);
            Ok(())
        })?;
        info!(id = %id, "snapshot deleted");
        Ok(())
    }
}

fn push_snapshot(data: &mut StoreData, name: &str, description: &str) -> Snapshot {
    let snapshot = Snapshot {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        variables: data.variables.clone(),
        created_at: Utc::now(),
    };
    data.snapshots.push(snapshot.clone());
    snapshot
}
