//! Variable operations.
//!
//! CRUD, history and search over the variables of the store's branch.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::registry::{self, SharedData};
use super::{reveal, StoreData, VariableStore};
use crate::core::cipher::{self, DataKey};
use crate::core::constants;
use crate::core::persist;
use crate::core::domain::{HistoryAction, HistoryEntry, HistoryFilter, Variable, VariableMetadata};
use crate::core::notifier::{ChangeKind, ReloadEvent};
use crate::core::validation::validate_name;
use crate::error::{Result, StoreError};

impl VariableStore {
    /// Create or update a variable.
    ///
    /// Sensitivity comes from `metadata`, else from the existing record,
    /// else defaults to plain. Sensitive values are encrypted before they
    /// are stored. `created_at` survives updates; `updated_at` is refreshed.
    /// Exactly one history entry is appended.
    ///
    /// # Returns
    ///
    /// The stored record with its value in plaintext.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthenticated` without a session,
    /// `ValidationError` for a bad name, and `StoreError::Persistence` if
    /// the store file cannot be written.
    pub fn set_variable(
        &self,
        name: &str,
        value: &str,
        metadata: VariableMetadata,
    ) -> Result<Variable> {
        validate_name(name)?;

        let branch = self.branch.clone();
        let (record, action) = self.mutate(|data, key| {
            let now = Utc::now();
            let existing = data.position(name, &branch).map(|i| data.variables[i].clone());

            let sensitive = metadata
                .sensitive
                .or(existing.as_ref().map(|v| v.sensitive))
                .unwrap_or(false);
            let stored = if sensitive {
                cipher::encrypt(value, key)?
            } else {
                value.to_string()
            };

            let record = Variable {
                name: name.to_string(),
                value: stored,
                category: metadata
                    .category
                    .or_else(|| existing.as_ref().map(|v| v.category.clone()))
                    .unwrap_or_else(|| constants::DEFAULT_CATEGORY.to_string()),
                description: metadata
                    .description
                    .or_else(|| existing.as_ref().map(|v| v.description.clone()))
                    .unwrap_or_default(),
                sensitive,
                encrypted: sensitive,
                branch: branch.clone(),
                created_at: existing.as_ref().map_or(now, |v| v.created_at),
                updated_at: now,
            };

            let action = if existing.is_some() {
                HistoryAction::Update
            } else {
                HistoryAction::Create
            };
            data.history.push(history_entry(
                action,
                name,
                &branch,
                existing.as_ref().map(|v| v.value.clone()),
                Some(record.value.clone()),
            ));

            match data.position(name, &branch) {
                Some(i) => data.variables[i] = record.clone(),
                None => data.variables.push(record.clone()),
            }
            Ok((record, action))
        })?;

        info!(name = %name, action = %action, sensitive = record.sensitive, "variable saved");
        self.emit(ReloadEvent::new(ChangeKind::VariableSet).with_variables([name]));

        let key = self.credentials.key()?;
        Ok(reveal(&record, &key))
    }

    /// Get one variable, decrypted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VariableNotFound` if the name does not exist on
    /// this branch.
    pub fn get_variable(&self, name: &str) -> Result<Variable> {
        let found = self.read(|data, key| {
            data.position(name, &self.branch)
                .map(|i| reveal(&data.variables[i], key))
        })?;
        debug!(name = %name, found = found.is_some(), "variable lookup");
        found.ok_or_else(|| StoreError::VariableNotFound(name.to_string()).into())
    }

    /// Get one variable, or `None` if it does not exist.
    pub fn find_variable(&self, name: &str) -> Result<Option<Variable>> {
        match self.get_variable(name) {
            Ok(v) => Ok(Some(v)),
            Err(crate::error::Error::Store(StoreError::VariableNotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether a variable exists on this branch.
    pub fn contains(&self, name: &str) -> Result<bool> {
        self.read(|data, _| data.position(name, &self.branch).is_some())
    }

    /// All variables of this branch, sorted by name, decrypted record by
    /// record.
    pub fn get_all_variables(&self) -> Result<Vec<Variable>> {
        self.read(|data, key| {
            let mut all: Vec<Variable> = branch_records(data, &self.branch)
                .map(|v| reveal(v, key))
                .collect();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        })
    }

    /// Number of variables on this branch.
    pub fn variable_count(&self) -> Result<usize> {
        self.read(|data, _| branch_records(data, &self.branch).count())
    }

    /// Delete a variable.
    ///
    /// # Returns
    ///
    /// `false` if the name did not exist on this branch.
    pub fn delete_variable(&self, name: &str) -> Result<bool> {
        let branch = self.branch.clone();
        let removed = self.mutate(|data, _| {
            let Some(i) = data.position(name, &branch) else {
                return Ok(false);
            };
            let old = data.variables.remove(i);
            data.history.push(history_entry(
                HistoryAction::Delete,
                name,
                &branch,
                Some(old.value),
                None,
            ));
            Ok(true)
        })?;

        if removed {
            info!(name = %name, "variable deleted");
            self.emit(ReloadEvent::new(ChangeKind::VariableDeleted).with_variables([name]));
        } else {
            debug!(name = %name, "delete of missing variable");
        }
        Ok(removed)
    }

    /// History of this branch, newest first.
    pub fn get_history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>> {
        self.read(|data, _| {
            let entries = data
                .history
                .iter()
                .rev()
                .filter(|e| e.branch == self.branch && filter.matches(e))
                .cloned();
            match filter.limit {
                Some(limit) => entries.take(limit).collect(),
                None => entries.collect(),
            }
        })
    }

    /// Case-insensitive search over name, description and category.
    ///
    /// Values are never searched.
    pub fn search(&self, query: &str) -> Result<Vec<Variable>> {
        let needle = query.to_lowercase();
        Ok(self
            .get_all_variables()?
            .into_iter()
            .filter(|v| {
                v.name.to_lowercase().contains(&needle)
                    || v.description.to_lowercase().contains(&needle)
                    || v.category.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Distinct categories in use on this branch, sorted.
    pub fn categories(&self) -> Result<Vec<String>> {
        self.read(|data, _| {
            let mut categories: Vec<String> = branch_records(data, &self.branch)
                .map(|v| v.category.clone())
                .collect();
            categories.sort();
            categories.dedup();
            categories
        })
    }

    /// Change the installation password, re-encrypting every sensitive
    /// value (live and in snapshots) of every project under the new key.
    ///
    /// The registry and the data of every affected store stay locked from
    /// the first re-encryption until the credential commit, so no write
    /// can land under the old key meanwhile. If any file or the
    /// credentials cannot be written, the files already rewritten are
    /// restored and memory is left untouched.
    ///
    /// Returns `Ok(false)` if `current` is wrong. History keeps the
    /// ciphertext it recorded at the time.
    pub fn change_password(&self, current: &str, new: &str) -> Result<bool> {
        let open = registry::lock();
        let Some(pending) = self.credentials.prepare_password_change(current, new)? else {
            return Ok(false);
        };
        let (old_key, new_key) = (pending.old_key.clone(), pending.new_key.clone());

        let mut stores: Vec<(PathBuf, SharedData)> = Vec::new();
        for file in self.store_files()? {
            let data = match open.live(&file) {
                Some(data) => data,
                None => {
                    let data: StoreData = persist::load_json(&file)?.unwrap_or_default();
                    Arc::new(Mutex::new(data))
                }
            };
            stores.push((file, data));
        }

        let mut held: Vec<_> = stores.iter().map(|(file, data)| (file, data.lock())).collect();
        let mut rekeyed = Vec::with_capacity(held.len());
        let mut count = 0;
        for (_, data) in &held {
            let mut working = StoreData::clone(data);
            count += rekey(&mut working, &old_key, &new_key)?;
            rekeyed.push(working);
        }

        let mut written = 0;
        let mut outcome = Ok(());
        for ((file, _), working) in held.iter().zip(&rekeyed) {
            if let Err(e) = persist::save_json(file, working) {
                outcome = Err(e);
                break;
            }
            written += 1;
        }
        let outcome = outcome.and_then(|()| self.credentials.commit_password_change(pending));

        if let Err(e) = outcome {
            warn!(
                error = %e,
                restoring = written,
                "password change failed, restoring previous ciphertext"
            );
            for (file, before) in held.iter().take(written) {
                if let Err(restore) = persist::save_json(file, &**before) {
                    warn!(file = %file.display(), error = %restore, "restore failed");
                }
            }
            return Err(e);
        }

        for ((_, live), working) in held.iter_mut().zip(rekeyed) {
            **live = working;
        }
        let projects = held.len();
        drop(held);
        drop(open);

        info!(projects, rekeyed = count, "stores re-encrypted under new password");
        self.emit(ReloadEvent::new(ChangeKind::PasswordChanged));
        Ok(true)
    }

    /// Every project store file under the data root, this one included,
    /// in path order.
    fn store_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = vec![self.file.clone()];
        if let Some(projects) = self.dir.parent().filter(|p| p.is_dir()) {
            for entry in std::fs::read_dir(projects)? {
                let file = entry?.path().join(constants::STORE_FILE);
                if file.is_file() {
                    files.push(file);
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Re-encrypt every encrypted record of `data` from `old` to `new`.
fn rekey(data: &mut StoreData, old: &DataKey, new: &DataKey) -> Result<usize> {
    let mut count = 0;
    let snapshot_records = data.snapshots.iter_mut().flat_map(|s| s.variables.iter_mut());
    for record in data.variables.iter_mut().chain(snapshot_records) {
        if record.encrypted {
            let plaintext = Zeroizing::new(cipher::decrypt(&record.value, old)?);
            record.value = cipher::encrypt(&plaintext, new)?;
            count += 1;
        }
    }
    Ok(count)
}

fn branch_records<'a>(data: &'a StoreData, branch: &'a str) -> impl Iterator<Item = &'a Variable> {
    data.variables.iter().filter(move |v| v.in_branch(branch))
}

pub(super) fn history_entry(
    action: HistoryAction,
    name: &str,
    branch: &str,
    old_value: Option<String>,
    new_value: Option<String>,
) -> HistoryEntry {
    HistoryEntry {
        id: Uuid::new_v4().to_string(),
        action,
        variable_name: name.to_string(),
        branch: branch.to_string(),
        old_value,
        new_value,
        timestamp: Utc::now(),
    }
}
