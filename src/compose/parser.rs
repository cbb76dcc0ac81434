//! Docker Compose file parser

use super::config::ComposeConfig;
use crate::error::{DevError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default compose file names
pub const DEFAULT_COMPOSE_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// File compose reads default variables from
pub const ENV_FILE: &str = ".env";

lazy_static! {
    /// Matches `$$`, `${VAR}`, `${VAR<op>word}` and `$VAR`
    static ref VARIABLE_REGEX: Regex = Regex::new(
        r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)(?:(:-|-|:\?|\?)([^}]*))?\}|([A-Za-z_][A-Za-z0-9_]*))"
    )
    .expect("valid regex");
}

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Find compose file in directory
    pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
        for name in DEFAULT_COMPOSE_FILES {
            let path = dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Variables available to compose files in `dir`: the `.env` file
    /// overlaid by the process environment.
    pub fn project_environment(dir: &Path) -> Result<HashMap<String, String>> {
        let mut env = Self::load_env_file(&dir.join(ENV_FILE))?;
        env.extend(std::env::vars());
        Ok(env)
    }

    /// Parse a `.env` file. A missing file yields no variables.
    pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>> {
        let env_error = |message: String| DevError::ComposeParse {
            path: path.to_path_buf(),
            message,
        };

        let iter = match dotenv::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new())
            }
            Err(e) => return Err(env_error(e.to_string())),
        };

        iter.map(|item| item.map_err(|e| env_error(e.to_string())))
            .collect()
    }

    /// Parse compose file from path
    pub fn parse_file(path: &Path, env: &HashMap<String, String>) -> Result<ComposeConfig> {
        let parse_error = |message: String| DevError::ComposeParse {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| parse_error(format!("Failed to read file: {}", e)))?;

        Self::parse_str(&content, env).map_err(|e| match e {
            DevError::Yaml(message) => parse_error(message),
            DevError::ComposeParse { message, .. } => parse_error(message),
            other => other,
        })
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str, env: &HashMap<String, String>) -> Result<ComposeConfig> {
        let content = Self::interpolate(content, env)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Substitute variables the way compose does.
    ///
    /// `${VAR:-word}` uses `word` when VAR is unset or empty, `${VAR-word}`
    /// only when unset. `${VAR:?msg}` and `${VAR?msg}` fail instead. Unset
    /// variables without a default become empty strings.
    pub fn interpolate(content: &str, env: &HashMap<String, String>) -> Result<String> {
        let mut missing: Option<String> = None;

        let result = VARIABLE_REGEX.replace_all(content, |caps: &Captures| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }

            let (name, operator, word) = match caps.get(5) {
                Some(bare) => (bare.as_str(), None, ""),
                None => (
                    caps.get(2).map_or("", |m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                    caps.get(4).map_or("", |m| m.as_str()),
                ),
            };

            let value = env.get(name);
            let unset_or_empty = value.map_or(true, |v| v.is_empty());

            let required = match operator {
                Some(":?") => unset_or_empty,
                Some("?") => value.is_none(),
                _ => false,
            };
            if required {
                missing.get_or_insert_with(|| {
                    if word.is_empty() {
                        format!("required variable {} is missing a value", name)
                    } else {
                        format!("required variable {} is missing a value: {}", name, word)
                    }
                });
                return String::new();
            }

            match operator {
                Some(":-") if unset_or_empty => word.to_string(),
                Some("-") if value.is_none() => word.to_string(),
                _ => match value {
                    Some(v) => v.clone(),
                    None => {
                        tracing::warn!("The \"{}\" variable is not set. Defaulting to a blank string.", name);
                        String::new()
                    }
                },
            }
        });
        let result = result.into_owned();

        match missing {
            Some(message) => Err(DevError::ComposeParse {
                path: PathBuf::new(),
                message,
            }),
            None => Ok(result),
        }
    }
}
