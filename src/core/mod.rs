//! Core library components.
//!
//! Credential gate, encrypted variable store, draft engine and change
//! notifier. Nothing in here prints or prompts.

pub mod auth;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod draft;
pub mod notifier;
pub mod persist;
pub mod store;
pub mod types;
pub mod validation;
