//! Branch resolution.
//!
//! Variables are scoped per git branch. The store only needs a branch
//! name; where it comes from is up to the caller.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::core::types::BranchName;

/// Supplies the branch name a store should scope to.
pub trait BranchResolver {
    fn current_branch(&self) -> BranchName;
}

/// Always the same branch.
#[derive(Debug, Clone)]
pub struct FixedBranch(pub BranchName);

impl BranchResolver for FixedBranch {
    fn current_branch(&self) -> BranchName {
        self.0.clone()
    }
}

/// Asks git for the checked-out branch, falling back when git cannot say
/// (not a repository, detached HEAD, git missing).
#[derive(Debug, Clone)]
pub struct GitBranch {
    dir: PathBuf,
    fallback: BranchName,
}

impl GitBranch {
    pub fn new(dir: impl AsRef<Path>, fallback: impl Into<BranchName>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            fallback: fallback.into(),
        }
    }
}

impl BranchResolver for GitBranch {
    fn current_branch(&self) -> BranchName {
        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .current_dir(&self.dir)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let name = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if name.is_empty() || name == "HEAD" {
                    self.fallback.clone()
                } else {
                    name
                }
            }
            Ok(_) | Err(_) => {
                debug!(dir = %self.dir.display(), "git branch unavailable, using fallback");
                self.fallback.clone()
            }
        }
    }
}
