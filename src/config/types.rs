//! Configuration types

use crate::compose::runner::DEFAULT_COMPOSE_COMMAND;
use crate::error::{DevError, Result};
use crate::network::NetworkOptions;
use crate::registry::RegistryConfig;
use crate::runtime::docker::DEFAULT_DOCKER_COMMAND;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevConfig {
    /// Compose project name used when a project sets none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prefix: Option<String>,
    /// Command used to run compose, e.g. `[docker, compose]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_command: Option<Vec<String>>,
    /// Docker binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_command: Option<String>,
    /// Declared networks, created before any project comes up
    pub networks: BTreeMap<String, NetworkOptions>,
    /// Registries to log in to
    pub registries: Vec<RegistryConfig>,
    /// Projects by name
    pub projects: BTreeMap<String, ProjectConfig>,
}

/// A project: a directory with one or more compose files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name (the key it is configured under)
    #[serde(skip)]
    pub name: String,
    /// Project directory
    pub directory: PathBuf,
    /// Compose files, relative to `directory`
    pub docker_compose_files: Vec<String>,
    /// Compose project name, overriding the global `image_prefix`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prefix: Option<String>,
}

impl ProjectConfig {
    /// Compose files as paths
    pub fn compose_paths(&self) -> Vec<PathBuf> {
        self.docker_compose_files
            .iter()
            .map(|file| self.directory.join(file))
            .collect()
    }
}

impl DevConfig {
    /// Look up a project by name
    pub fn project(&self, name: &str) -> Result<&ProjectConfig> {
        self.projects
            .get(name)
            .ok_or_else(|| DevError::ProjectNotFound(name.to_string()))
    }

    /// Compose project name for `project`
    pub fn image_prefix_for(&self, project: &ProjectConfig) -> String {
        project
            .image_prefix
            .clone()
            .or_else(|| self.image_prefix.clone())
            .unwrap_or_else(|| project.name.clone())
    }

    /// Command used to run compose
    pub fn compose_command(&self) -> Vec<String> {
        self.compose_command.clone().unwrap_or_else(|| {
            DEFAULT_COMPOSE_COMMAND.iter().map(|s| s.to_string()).collect()
        })
    }

    /// Docker binary
    pub fn docker_command(&self) -> &str {
        self.docker_command.as_deref().unwrap_or(DEFAULT_DOCKER_COMMAND)
    }

    /// Merge `overlay` over this configuration.
    ///
    /// Scalars in the overlay win when set. Networks and projects merge by
    /// key and registries by name, the overlay winning each conflict.
    pub fn merge(mut self, overlay: DevConfig) -> DevConfig {
        if overlay.image_prefix.is_some() {
            self.image_prefix = overlay.image_prefix;
        }
        if overlay.compose_command.is_some() {
            self.compose_command = overlay.compose_command;
        }
        if overlay.docker_command.is_some() {
            self.docker_command = overlay.docker_command;
        }

        self.networks.extend(overlay.networks);
        self.projects.extend(overlay.projects);

        for registry in overlay.registries {
            match self.registries.iter_mut().find(|r| r.name == registry.name) {
                Some(existing) => *existing = registry,
                None => self.registries.push(registry),
            }
        }

        self
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        for (name, options) in &self.networks {
            if name.trim().is_empty() {
                return Err(DevError::Config("network name must not be empty".to_string()));
            }
            options.validate(name)?;
        }

        for registry in &self.registries {
            registry.validate()?;
        }

        if let Some(command) = &self.compose_command {
            if command.first().map_or(true, |c| c.trim().is_empty()) {
                return Err(DevError::Config("compose_command must not be empty".to_string()));
            }
        }

        for (name, project) in &self.projects {
            if name.trim().is_empty() {
                return Err(DevError::Config("project name must not be empty".to_string()));
            }
            if project.docker_compose_files.iter().any(|f| f.trim().is_empty()) {
                return Err(DevError::Config(format!(
                    "project {} lists an empty compose file name",
                    name
                )));
            }
        }

        Ok(())
    }
}
