//! Domain types.

mod change;
mod draft;
mod history;
mod snapshot;
mod variable;
mod version;

pub use change::{ChangeType, VariableChange};
pub use draft::{DraftSession, DraftUpdate, DraftVariable};
pub use history::{HistoryAction, HistoryEntry, HistoryFilter};
pub use snapshot::Snapshot;
pub use variable::{Variable, VariableMetadata};
pub use version::VersionEntry;
