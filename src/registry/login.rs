//! Registry login

use super::config::RegistryConfig;
use crate::error::{DevError, Outcome, Result};
use crate::runtime::command::capture;
use crate::runtime::docker::DEFAULT_DOCKER_COMMAND;
use async_trait::async_trait;

/// Authenticates against a container registry
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Log in to `registry`; `Err` carries the reason
    async fn login(&self, registry: &RegistryConfig) -> Result<()>;
}

/// Logs in through `docker login` so the daemon can pull with the credentials
#[derive(Debug, Clone)]
pub struct DockerLogin {
    program: String,
}

impl Default for DockerLogin {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_COMMAND)
    }
}

impl DockerLogin {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

/// Arguments for `docker login`; the password goes over stdin
fn login_args(registry: &RegistryConfig) -> Vec<String> {
    vec![
        "login".to_string(),
        "--username".to_string(),
        registry.login_user().to_string(),
        "--password-stdin".to_string(),
        registry.url.clone(),
    ]
}

#[async_trait]
impl RegistryClient for DockerLogin {
    async fn login(&self, registry: &RegistryConfig) -> Result<()> {
        let login_error = |message: String| DevError::RegistryLogin {
            registry: registry.name.clone(),
            message,
        };

        let output = capture(&self.program, &login_args(registry), Some(&registry.password))
            .await
            .map_err(|e| login_error(e.to_string()))?;

        if !output.success {
            return Err(login_error(output.message()));
        }
        Ok(())
    }
}

/// Log in to every registry, in order, exactly once.
///
/// A failed login is a warning for registries marked `continue_on_failure`
/// and fatal for the rest; a fatal failure stops before later registries.
pub async fn login_registries(
    client: &dyn RegistryClient,
    registries: &[RegistryConfig],
) -> Result<Outcome<()>> {
    let mut warnings = Vec::new();

    for registry in registries {
        match client.login(registry).await {
            Ok(()) => {
                tracing::debug!("Logged in to registry {} at {}", registry.name, registry.url);
            }
            Err(e) if registry.continue_on_failure => {
                tracing::warn!("{}", e);
                warnings.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Outcome::with_warnings((), warnings))
}
