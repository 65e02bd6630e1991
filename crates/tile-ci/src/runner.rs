//! External process execution.

use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// A command to run and how to wire its output.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Human-readable name used in logs and errors.
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Capture stdout/stderr into buffers (`true`) or inherit the parent's
    /// streams (`false`).
    pub capture: bool,

    /// Timeout in seconds; 0 disables the timeout.
    pub timeout_secs: u64,
}

impl CommandSpec {
    /// Command whose output is captured.
    pub fn captured(name: &str, command: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            command,
            capture: true,
            timeout_secs: 0,
        }
    }

    /// Command that writes straight to the parent's stdout/stderr.
    pub fn inherited(name: &str, command: Vec<String>) -> Self {
        Self {
            capture: false,
            ..Self::captured(name, command)
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Result of a process execution.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Command name.
    pub name: String,

    /// Exit code (-1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout (empty when inherited).
    pub stdout: String,

    /// Captured stderr (empty when inherited).
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited successfully.
    pub success: bool,
}

impl ProcessOutput {
    /// Whether the process exited with code 0.
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Runs external commands on the tokio runtime.
pub struct ProcessRunner;

impl ProcessRunner {
    /// Execute a command and wait for it to exit.
    ///
    /// When capturing, stdout and stderr are drained concurrently so a full
    /// pipe on one stream cannot stall the child.
    pub async fn execute(spec: &CommandSpec) -> anyhow::Result<ProcessOutput> {
        let start = Instant::now();

        if spec.command.is_empty() {
            anyhow::bail!("Command {} is empty", spec.name);
        }

        let exe = &spec.command[0];
        let args = &spec.command[1..];

        let (stdout, stderr) = if spec.capture {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        let child = Command::new(exe)
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", spec.name, e))?;

        let output = if spec.timeout_secs > 0 {
            tokio::time::timeout(
                std::time::Duration::from_secs(spec.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} timed out after {} seconds",
                    spec.name,
                    spec.timeout_secs
                )
            })??
        } else {
            child.wait_with_output().await?
        };

        Ok(ProcessOutput {
            name: spec.name.clone(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            success: output.status.success(),
        })
    }
}
