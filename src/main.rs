//! envdeck - Local encrypted environment variables with drafts and reloads.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use envdeck::cli::output;
use envdeck::cli::{execute, Cli};
use envdeck::error::{ConfigError, Error, StoreError, ValidationError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("ENVDECK_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("envdeck=debug")
        } else {
            EnvFilter::new("envdeck=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Unauthenticated => Some("check the password or ENVDECK_PASSWORD"),
            Error::Validation(ValidationError::EmptyPassword) => {
                Some("set ENVDECK_PASSWORD when not running in a terminal")
            }
            Error::Store(StoreError::VariableNotFound(_)) => Some("run: envdeck list"),
            Error::Store(StoreError::SnapshotNotFound(_)) => Some("run: envdeck snapshot list"),
            Error::Config(ConfigError::InvalidValue { .. }) => {
                Some("fix config.toml in the envdeck data directory")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
