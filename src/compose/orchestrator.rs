//! Docker Compose orchestrator

use super::runner::{ComposeCli, ComposeInvocation, ComposeRunner};
use crate::config::{DevConfig, ProjectConfig};
use crate::container::verify;
use crate::error::{DevError, Result};
use crate::network::{ensure_networks, NetworkIdMap};
use crate::registry::{login_registries, DockerLogin, RegistryClient};
use crate::runtime::{ContainerRuntime, DockerCli};
use std::sync::Arc;

/// Stages of `up`, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Log in to the configured registries
    LoginRegistries,
    /// Create missing declared networks
    EnsureNetworks,
    /// Remove containers pointing at recreated networks
    ReconcileContainers,
    /// `compose up -d`
    ComposeUp,
    /// `compose logs -f`
    TailLogs,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::LoginRegistries => write!(f, "login-registries"),
            Stage::EnsureNetworks => write!(f, "ensure-networks"),
            Stage::ReconcileContainers => write!(f, "reconcile-containers"),
            Stage::ComposeUp => write!(f, "compose-up"),
            Stage::TailLogs => write!(f, "tail-logs"),
        }
    }
}

/// What an `up` run did
#[derive(Debug, Default)]
pub struct UpReport {
    /// Tolerated failures
    pub warnings: Vec<DevError>,
    /// Identifier of every declared network
    pub network_ids: NetworkIdMap,
    /// Containers removed because their network was recreated
    pub removed_containers: Vec<String>,
    /// Exit status of the last compose command run
    pub exit_code: i32,
}

impl UpReport {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Compose orchestrator
pub struct ComposeOrchestrator {
    registry: Arc<dyn RegistryClient>,
    runtime: Arc<dyn ContainerRuntime>,
    compose: Arc<dyn ComposeRunner>,
}

impl ComposeOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        runtime: Arc<dyn ContainerRuntime>,
        compose: Arc<dyn ComposeRunner>,
    ) -> Self {
        Self {
            registry,
            runtime,
            compose,
        }
    }

    /// Orchestrator driving the docker and compose CLIs named in `config`
    pub fn docker(config: &DevConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(DockerLogin::new(config.docker_command())),
            Arc::new(DockerCli::new(config.docker_command())),
            Arc::new(ComposeCli::new(config.compose_command())?),
        ))
    }

    /// Bring `project` up, then follow its logs if `tail_logs` is set.
    ///
    /// Failures before compose runs are returned as errors and stop the
    /// sequence. Compose's own exit status is carried in the report; a failed
    /// `up` skips the log tail.
    pub async fn up(&self, config: &DevConfig, project: &ProjectConfig, tail_logs: bool) -> Result<UpReport> {
        if project.docker_compose_files.is_empty() {
            return Err(DevError::Config(format!(
                "project {} has no compose files and none was found in {}",
                project.name,
                project.directory.display()
            )));
        }

        tracing::info!("Starting project: {}", project.name);
        let mut report = UpReport::default();

        enter(Stage::LoginRegistries);
        let (_, warnings) = login_registries(self.registry.as_ref(), &config.registries)
            .await?
            .into_parts();
        report.warnings = warnings;

        enter(Stage::EnsureNetworks);
        report.network_ids = ensure_networks(self.runtime.as_ref(), &config.networks).await?;

        let compose_project = config.image_prefix_for(project);

        enter(Stage::ReconcileContainers);
        report.removed_containers =
            verify(self.runtime.as_ref(), project, &compose_project, &report.network_ids).await?;

        enter(Stage::ComposeUp);
        let up = ComposeInvocation::up(
            &compose_project,
            project.directory.clone(),
            project.docker_compose_files.clone(),
        );
        report.exit_code = self.compose.run(&up).await?;
        if !report.success() {
            tracing::warn!("compose up for {} exited with status {}", project.name, report.exit_code);
            return Ok(report);
        }

        if tail_logs {
            enter(Stage::TailLogs);
            let logs = ComposeInvocation::logs(
                &compose_project,
                project.directory.clone(),
                project.docker_compose_files.clone(),
                &project.name,
            );
            report.exit_code = self.compose.run(&logs).await?;
        }

        Ok(report)
    }
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "Entering stage");
}
