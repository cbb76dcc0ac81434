//! Child process helpers shared by the docker and compose adapters

use crate::error::{DevError, Result};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured output of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Best human readable description of a failure
    pub fn message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Run a program to completion and capture its output.
///
/// `stdin` is written to the child and then closed; without it the child
/// gets `/dev/null`.
pub async fn capture(program: &str, args: &[String], stdin: Option<&str>) -> Result<CommandOutput> {
    tracing::debug!(program, ?args, "Running command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                let _ = child.kill().await;
                return Err(spawn_error(program, e));
            }
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Map an error from spawning or waiting on `program`
pub fn spawn_error(program: &str, e: std::io::Error) -> DevError {
    DevError::Command {
        program: program.to_string(),
        message: e.to_string(),
    }
}

/// Exit code to propagate for a finished child.
///
/// Children killed by a signal report `128 + signal`, the shell convention.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
