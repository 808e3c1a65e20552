//! Serve command: run the change notifier in the foreground.
//!
//! Remote triggers are accepted only when signed with a key derived from
//! the store password, so serving needs the password too.

use tracing::info;

use crate::cli::context::authenticate;
use crate::cli::output;
use crate::core::cipher::SignalKey;
use crate::core::config::{Paths, Settings};
use crate::core::notifier::{ChangeNotifier, NotifierConfigUpdate};
use crate::error::{Error, Result};

/// Start the notifier and block until Ctrl-C.
pub fn execute(port: Option<u16>) -> Result<()> {
    let paths = Paths::resolve()?;
    let settings = Settings::load(&paths)?;
    let signal_key = {
        let (credentials, _password) = authenticate(&paths)?;
        SignalKey::derive(&credentials.key()?)?
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let notifier = ChangeNotifier::new(settings.notifier.to_config())?;
        if port.is_some() {
            notifier.update_config(NotifierConfigUpdate {
                port,
                ..NotifierConfigUpdate::default()
            })?;
        }
        notifier.set_signal_key(signal_key);
        let addr = notifier.start()?;
        let config = notifier.config();

        output::success(&format!("notifier listening on {}", addr));
        output::kv("debounce", format!("{} ms", config.debounce_ms));
        output::kv("mode", config.mode);
        if let Some(command) = &config.command {
            output::kv("command", output::cmd(command));
        }
        output::hint("press Ctrl-C to stop");

        tokio::signal::ctrl_c().await?;
        info!("shutting down notifier");
        notifier.stop();
        output::success("notifier stopped");
        Ok::<(), Error>(())
    })
}
