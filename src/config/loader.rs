//! Configuration discovery and loading
//!
//! # Lookup
//!
//! ```text
//! ~/.devstack.yaml              (loaded first)
//! /.devstack.yaml
//! /work/.devstack.yaml
//! /work/api/.devstack.yaml      (current directory, loaded last)
//! ```
//!
//! Every file found is merged over the ones before it. An explicit path
//! (`--config` or `DEVSTACK_CONFIG`) replaces the lookup.
//!
//! Functions taking `home` and `cwd` never consult the real environment, so
//! tests call them with temporary directories.

use super::types::DevConfig;
use crate::compose::ComposeParser;
use crate::error::{DevError, Result};
use std::path::{Path, PathBuf};

/// Configuration file names, in order of preference
pub const CONFIG_FILE_NAMES: &[&str] = &[".devstack.yaml", ".devstack.yml"];

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "DEVSTACK_CONFIG";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `explicit` if given, otherwise discover from the current directory
    pub fn load(explicit: Option<&Path>) -> Result<DevConfig> {
        let home = dirs::home_dir();
        match explicit {
            Some(path) => Self::load_file(path, home.as_deref()),
            None => Self::discover_at(home.as_deref(), &std::env::current_dir()?),
        }
    }

    /// Find configuration file in directory
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Directories searched, lowest precedence first
    pub fn search_dirs(home: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = home.map(Path::to_path_buf).into_iter().collect();

        let mut ancestors: Vec<&Path> = cwd.ancestors().collect();
        ancestors.reverse();
        for dir in ancestors {
            if !dirs.iter().any(|d| d == dir) {
                dirs.push(dir.to_path_buf());
            }
        }

        dirs
    }

    /// Load and merge every configuration file visible from `cwd`
    pub fn discover_at(home: Option<&Path>, cwd: &Path) -> Result<DevConfig> {
        let dirs = Self::search_dirs(home, cwd);
        let files: Vec<PathBuf> = dirs.iter().filter_map(|d| Self::find_config_file(d)).collect();

        if files.is_empty() {
            return Err(DevError::ConfigNotFound {
                searched: dirs.iter().map(|d| d.join(CONFIG_FILE_NAMES[0])).collect(),
            });
        }

        let mut config = DevConfig::default();
        for file in &files {
            config = config.merge(Self::read_file(file, home)?);
        }

        Self::finalize(config)
    }

    /// Load a single configuration file
    pub fn load_file(path: &Path, home: Option<&Path>) -> Result<DevConfig> {
        Self::finalize(Self::read_file(path, home)?)
    }

    /// Parse configuration from string
    pub fn parse_str(content: &str) -> Result<DevConfig> {
        if content.trim().is_empty() {
            return Ok(DevConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse one file and anchor its project directories at the file's location
    fn read_file(path: &Path, home: Option<&Path>) -> Result<DevConfig> {
        tracing::debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| DevError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::parse_str(&content)
            .map_err(|e| DevError::Config(format!("{}: {}", path.display(), e)))?;

        let base = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        for project in config.projects.values_mut() {
            project.directory = if project.directory.as_os_str().is_empty() {
                base.clone()
            } else {
                base.join(expand_home(&project.directory, home))
            };
        }

        Ok(config)
    }

    /// Name projects, fill in default compose files, and validate
    fn finalize(mut config: DevConfig) -> Result<DevConfig> {
        for (name, project) in config.projects.iter_mut() {
            project.name = name.clone();

            if project.docker_compose_files.is_empty() {
                let found = ComposeParser::find_compose_file(&project.directory)
                    .and_then(|path| path.file_name().map(|f| f.to_string_lossy().into_owned()));
                if let Some(file) = found {
                    project.docker_compose_files.push(file);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home.to_path_buf(),
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
