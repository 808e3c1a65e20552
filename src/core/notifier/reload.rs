//! Reload action.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use super::{NotifierConfig, ReloadEvent, ReloadMode};

/// Run the configured action for `event` to completion.
///
/// The command sees the event through `ENVDECK_RELOAD_*` variables.
/// A non-zero exit is reported with the trimmed stderr.
pub(crate) async fn run(config: &NotifierConfig, event: &ReloadEvent) -> Result<(), String> {
    let command = match (config.mode, config.command.as_deref()) {
        (ReloadMode::NotifyOnly, _) => return Ok(()),
        (ReloadMode::Command, Some(command)) => command,
        (ReloadMode::Command, None) => return Err("no reload command configured".to_string()),
    };

    debug!(command = %command, kind = %event.kind, "running reload command");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .env("ENVDECK_RELOAD_KIND", event.kind.as_str())
        .env("ENVDECK_RELOAD_VARIABLES", event.variables.join(","))
        .env("ENVDECK_RELOAD_BRANCH", event.branch.as_deref().unwrap_or_default())
        .env("ENVDECK_RELOAD_VERSION", event.version.as_deref().unwrap_or_default())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("failed to spawn reload command: {}", e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    warn!(status = %output.status, "reload command failed");
    Err(if stderr.is_empty() {
        format!("reload command exited with {}", output.status)
    } else {
        stderr
    })
}
