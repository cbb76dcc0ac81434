//! Delegation to the `docker compose` CLI

use crate::error::{DevError, Result};
use crate::runtime::command::{exit_code, spawn_error};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Default compose command
pub const DEFAULT_COMPOSE_COMMAND: &[&str] = &["docker", "compose"];

/// One compose invocation for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInvocation {
    /// Compose project name (`-p`); compose prefixes images and containers with it
    pub project_name: String,
    /// Working directory compose runs in
    pub directory: PathBuf,
    /// Compose files (`-f`), relative to `directory` or absolute
    pub files: Vec<String>,
    /// Subcommand and its arguments
    pub args: Vec<String>,
}

impl ComposeInvocation {
    /// `up -d`
    pub fn up(project_name: &str, directory: PathBuf, files: Vec<String>) -> Self {
        Self {
            project_name: project_name.to_string(),
            directory,
            files,
            args: vec!["up".to_string(), "-d".to_string()],
        }
    }

    /// `logs -f <service>`
    pub fn logs(project_name: &str, directory: PathBuf, files: Vec<String>, service: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            directory,
            files,
            args: vec!["logs".to_string(), "-f".to_string(), service.to_string()],
        }
    }

    /// Arguments following the compose command
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-p".to_string(), self.project_name.clone()];
        for file in &self.files {
            args.push("-f".to_string());
            args.push(file.clone());
        }
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Runs compose and reports its exit status
#[async_trait]
pub trait ComposeRunner: Send + Sync {
    /// Run the invocation to completion and return its exit code
    async fn run(&self, invocation: &ComposeInvocation) -> Result<i32>;
}

/// Runs compose as a child process sharing this process's terminal
#[derive(Debug, Clone)]
pub struct ComposeCli {
    command: Vec<String>,
}

impl Default for ComposeCli {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMPOSE_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ComposeCli {
    /// Create a runner for `command`, e.g. `["docker", "compose"]` or `["docker-compose"]`
    pub fn new(command: Vec<String>) -> Result<Self> {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(DevError::Config("compose command must not be empty".to_string()));
        }
        Ok(Self { command })
    }

    fn program(&self) -> &str {
        &self.command[0]
    }
}

#[async_trait]
impl ComposeRunner for ComposeCli {
    async fn run(&self, invocation: &ComposeInvocation) -> Result<i32> {
        let mut args: Vec<String> = self.command[1..].to_vec();
        args.extend(invocation.to_args());

        tracing::debug!(program = self.program(), ?args, directory = %invocation.directory.display(), "Running compose");

        let mut child = Command::new(self.program())
            .args(&args)
            .current_dir(&invocation.directory)
            .spawn()
            .map_err(|e| spawn_error(self.program(), e))?;

        // Ctrl-C reaches compose through the terminal's process group; wait
        // for it to wind down and report how it exited.
        let status = tokio::select! {
            status = child.wait() => status,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted, waiting for compose to exit");
                child.wait().await
            }
        }
        .map_err(|e| spawn_error(self.program(), e))?;

        Ok(exit_code(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<String> {
        vec!["docker-compose.yml".to_string(), "docker-compose.dev.yml".to_string()]
    }

    #[test]
    fn test_up_args() {
        let invocation = ComposeInvocation::up("acme", PathBuf::from("/src/api"), files());
        assert_eq!(
            invocation.to_args(),
            vec![
                "-p",
                "acme",
                "-f",
                "docker-compose.yml",
                "-f",
                "docker-compose.dev.yml",
                "up",
                "-d",
            ]
        );
    }

    #[test]
    fn test_logs_args() {
        let invocation = ComposeInvocation::logs("acme", PathBuf::from("/src/api"), files(), "api");
        assert_eq!(
            invocation.to_args()[6..],
            ["logs".to_string(), "-f".to_string(), "api".to_string()]
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(ComposeCli::new(Vec::new()).is_err());
        assert!(ComposeCli::new(vec![" ".to_string()]).is_err());
        assert!(ComposeCli::new(vec!["docker-compose".to_string()]).is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_inherited() {
        let dir = tempfile::tempdir().unwrap();
        // `sh -c 'exit 4' <args...>` ignores the compose arguments
        let runner = ComposeCli::new(vec!["sh".to_string(), "-c".to_string(), "exit 4".to_string()]).unwrap();
        let invocation = ComposeInvocation::up("acme", dir.path().to_path_buf(), files());

        assert_eq!(runner.run(&invocation).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ComposeCli::new(vec!["devstack-no-such-compose".to_string()]).unwrap();
        let invocation = ComposeInvocation::up("acme", dir.path().to_path_buf(), files());

        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, DevError::Command { .. }));
    }
}
