//! Container runtime access
//!
//! The tool only needs a handful of runtime operations: looking up and
//! creating networks, and finding and removing the containers compose
//! created for a service. They sit behind [`ContainerRuntime`] so the
//! reconciliation logic can run against a fake in tests.

pub mod command;
pub mod docker;

pub use docker::DockerCli;

use crate::error::Result;
use crate::network::NetworkOptions;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Label docker compose stamps with the project name
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
/// Label docker compose stamps with the service name
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// A container and the network ids it was configured with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerNetworks {
    /// Container ID
    pub id: String,
    /// Container name
    pub name: String,
    /// Network name to the network id stored on the container
    pub networks: BTreeMap<String, String>,
}

impl ContainerNetworks {
    /// Whether the container references `network` by an id other than `network_id`.
    ///
    /// An empty stored id is not stale: the runtime resolves it by name at start.
    pub fn is_stale(&self, network: &str, network_id: &str) -> bool {
        self.networks
            .get(network)
            .is_some_and(|stored| !stored.is_empty() && stored != network_id)
    }
}

/// Operations the tool needs from the container runtime
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Identifier of the network called `name`, if it exists
    async fn network_id(&self, name: &str) -> Result<Option<String>>;

    /// Create the network `name` and return its identifier
    async fn create_network(&self, name: &str, options: &NetworkOptions) -> Result<String>;

    /// All containers (running or not) compose created for `service` in `project`
    async fn service_containers(&self, project: &str, service: &str) -> Result<Vec<ContainerNetworks>>;

    /// Force-remove the container `id`
    async fn remove_container(&self, id: &str) -> Result<()>;
}
