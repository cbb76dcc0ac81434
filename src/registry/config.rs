//! Registry configuration

use crate::error::{DevError, Result};
use serde::{Deserialize, Serialize};

/// A registry to log in to before bringing a project up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry name, also the login user unless `username` is set
    pub name: String,
    /// Registry URL
    pub url: String,
    /// Username for authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password for authentication
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Log a warning instead of aborting when login fails
    #[serde(default)]
    pub continue_on_failure: bool,
}

impl RegistryConfig {
    /// Create a new registry configuration
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Set password
    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Set username
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Set continue_on_failure
    pub fn continue_on_failure(mut self, tolerate: bool) -> Self {
        self.continue_on_failure = tolerate;
        self
    }

    /// User to log in as
    pub fn login_user(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DevError::Config("registry name must not be empty".to_string()));
        }
        if self.url.trim().is_empty() {
            return Err(DevError::Config(format!("registry {} has no url", self.name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_user_defaults_to_name() {
        let registry = RegistryConfig::new("robot", "registry.example.com");
        assert_eq!(registry.login_user(), "robot");

        let registry = registry.username("ci-bot");
        assert_eq!(registry.login_user(), "ci-bot");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let registry = RegistryConfig::new("ci", "registry.example.com").password("hunter2");
        let yaml = serde_yaml::to_string(&registry).unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(!yaml.contains("password"));
    }

    #[test]
    fn test_deserialize() {
        let yaml = r#"
name: ci
url: registry.example.com
password: s3cret
continue_on_failure: true
"#;
        let registry: RegistryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(registry, RegistryConfig::new("ci", "registry.example.com").password("s3cret").continue_on_failure(true));
    }

    #[test]
    fn test_validate() {
        assert!(RegistryConfig::new("ci", "registry.example.com").validate().is_ok());
        assert!(RegistryConfig::new("", "registry.example.com").validate().is_err());
        assert!(RegistryConfig::new("ci", " ").validate().is_err());
    }
}
