//! Passwd command.

use crate::cli::context::{read_password, Scope, Session};
use crate::cli::output;
use crate::core::constants;
use crate::error::{Error, Result, ValidationError};

/// Change the store password and re-encrypt sensitive values.
pub fn execute(scope: &Scope) -> Result<()> {
    let session = Session::open(scope)?;
    let new = read_password("New password", constants::NEW_PASSWORD_ENV)?;
    if new.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }
    if std::env::var_os(constants::NEW_PASSWORD_ENV).is_none() {
        let confirm = read_password("Confirm new password", constants::NEW_PASSWORD_ENV)?;
        if *confirm != *new {
            return Err(ValidationError::PasswordMismatch.into());
        }
    }

    if !session.store.change_password(session.password(), &new)? {
        return Err(Error::Unauthenticated);
    }
    output::success("password changed");
    Ok(())
}
