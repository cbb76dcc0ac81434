//! Error types for devstack

use std::path::PathBuf;
use thiserror::Error;

/// Result type for devstack operations
pub type Result<T> = std::result::Result<T, DevError>;

/// devstack error types
///
/// Every variant is fatal once it reaches `main`. Failures that the
/// configuration marks as tolerable travel inside [`Outcome::Warning`]
/// instead of through `Err`.
#[derive(Error, Debug)]
pub enum DevError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No configuration file found (searched {})", display_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Failed to login to {registry} registry: {message}")]
    RegistryLogin { registry: String, message: String },

    #[error("Error checking if network {name} exists: {message}")]
    NetworkQuery { name: String, message: String },

    #[error("Failed to create network {name}: {message}")]
    NetworkCreate { name: String, message: String },

    #[error("Failed to list containers for service {service}: {message}")]
    ContainerQuery { service: String, message: String },

    #[error("Failed to remove container {id}: {message}")]
    ContainerRemove { id: String, message: String },

    #[error("Failed to parse compose file {}: {message}", .path.display())]
    ComposeParse { path: PathBuf, message: String },

    #[error("Failed to run {program}: {message}")]
    Command { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for DevError {
    fn from(e: serde_yaml::Error) -> Self {
        DevError::Yaml(e.to_string())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a stage that may degrade without failing the run.
///
/// Paired with `Result`, this gives the three severities the driver
/// distinguishes: success, recoverable warning, and fatal error.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Stage completed cleanly
    Success(T),
    /// Stage completed, but some tolerated operations failed
    Warning(T, Vec<DevError>),
}

impl<T> Outcome<T> {
    /// Build an outcome from a value and the warnings collected alongside it
    pub fn with_warnings(value: T, warnings: Vec<DevError>) -> Self {
        if warnings.is_empty() {
            Outcome::Success(value)
        } else {
            Outcome::Warning(value, warnings)
        }
    }

    /// Split into the value and any warnings
    pub fn into_parts(self) -> (T, Vec<DevError>) {
        match self {
            Outcome::Success(value) => (value, Vec::new()),
            Outcome::Warning(value, warnings) => (value, warnings),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
