//! Reviewer CLI installation.

use crate::error::{PublishError, Result};
use crate::runner::{CommandSpec, ProcessRunner};
use tracing::info;

/// Official installer for the `tessl` CLI.
pub const INSTALL_SCRIPT: &str = "curl -fsSL https://get.tessl.io | sh";

/// Seconds allowed for the `command -v` lookup.
const LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Seconds allowed for the installer.
const INSTALL_TIMEOUT_SECS: u64 = 300;

/// What [`install_with`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    AlreadyInstalled,
    Installed,
}

/// Look up `tool` on `PATH` and run `install_script` through `sh -c` when missing.
///
/// Installer output streams straight to the job log. A non-zero exit is
/// reported as [`PublishError::InstallFailed`].
pub async fn install_with(tool: &str, install_script: &str) -> Result<InstallStatus> {
    if is_on_path(tool).await {
        info!(tool = %tool, "Reviewer CLI already installed");
        return Ok(InstallStatus::AlreadyInstalled);
    }

    info!(tool = %tool, "Installing reviewer CLI");
    let spec = CommandSpec::inherited(
        "install_reviewer",
        vec!["sh".to_string(), "-c".to_string(), install_script.to_string()],
    )
    .with_timeout(INSTALL_TIMEOUT_SECS);
    let output = ProcessRunner::execute(&spec)
        .await
        .map_err(|e| PublishError::Process(e.to_string()))?;

    if !output.passed() {
        return Err(PublishError::InstallFailed {
            exit_code: output.exit_code,
        });
    }

    info!(tool = %tool, duration_ms = output.duration_ms, "Reviewer CLI installed");
    Ok(InstallStatus::Installed)
}

async fn is_on_path(tool: &str) -> bool {
    let spec = CommandSpec::captured(
        "locate_reviewer",
        vec![
            "sh".to_string(),
            "-c".to_string(),
            "command -v \"$1\"".to_string(),
            "sh".to_string(),
            tool.to_string(),
        ],
    )
    .with_timeout(LOOKUP_TIMEOUT_SECS);
    matches!(ProcessRunner::execute(&spec).await, Ok(output) if output.passed())
}
