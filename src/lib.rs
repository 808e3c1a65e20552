//! envdeck - Local encrypted environment variables with drafts and reloads.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/                # Command-line interface
//! │   ├── context         # Password, settings and store opening
//! │   ├── variables       # set, get, rm, list, history
//! │   ├── snapshot        # Snapshot create/list/restore/rm
//! │   ├── publish         # Batch changes through a draft, list versions
//! │   ├── passwd          # Password change
//! │   ├── serve           # Run the change notifier
//! │   └── completions     # Shell completions
//! └── core/               # Core library components
//!     ├── auth            # Credential store, session key
//!     ├── cipher/         # AES-256-GCM values, PBKDF2 key derivation
//!     ├── config          # Data root paths, config.toml
//!     ├── domain/         # Variable, history, snapshot, draft, version types
//!     ├── store/          # Variable store, snapshots, branch resolution
//!     ├── draft/          # Draft engine, publishing, version history
//!     └── notifier/       # Debounced reload broadcasts over loopback TCP
//! ```
//!
//! # Flow
//!
//! A caller authenticates through [`CredentialStore`], opens a
//! [`VariableStore`] for a project and either writes directly or stages a
//! batch in a [`DraftEngine`] and publishes it. Each committed change is
//! handed to the store's [`ChangeSink`], typically a [`ChangeNotifier`],
//! which coalesces bursts and tells its listeners to reload.
//!
//! [`CredentialStore`]: core::auth::CredentialStore
//! [`VariableStore`]: core::store::VariableStore
//! [`DraftEngine`]: core::draft::DraftEngine
//! [`ChangeSink`]: core::notifier::ChangeSink
//! [`ChangeNotifier`]: core::notifier::ChangeNotifier

pub mod cli;
pub mod core;
pub mod error;
