//! Recording fakes for the external collaborators

use crate::compose::{ComposeInvocation, ComposeRunner};
use crate::error::{DevError, Result};
use crate::network::NetworkOptions;
use crate::registry::{RegistryClient, RegistryConfig};
use crate::runtime::{ContainerNetworks, ContainerRuntime};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

/// A call received by [`FakeRuntime`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    NetworkId(String),
    CreateNetwork(String, NetworkOptions),
    ServiceContainers { project: String, service: String },
    RemoveContainer(String),
}

/// In-memory container runtime
#[derive(Default)]
pub struct FakeRuntime {
    networks: Mutex<BTreeMap<String, String>>,
    containers: Mutex<BTreeMap<String, Vec<ContainerNetworks>>>,
    calls: Mutex<Vec<RuntimeCall>>,
    failing_query: BTreeSet<String>,
    failing_create: BTreeSet<String>,
    failing_remove: BTreeSet<String>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(self, name: &str, id: &str) -> Self {
        self.networks.lock().unwrap().insert(name.to_string(), id.to_string());
        self
    }

    /// Register a container of `service` attached to `networks` (name, id)
    pub fn with_container(self, service: &str, id: &str, networks: &[(&str, &str)]) -> Self {
        let container = ContainerNetworks {
            id: id.to_string(),
            name: format!("{}-1", service),
            networks: networks
                .iter()
                .map(|(n, i)| (n.to_string(), i.to_string()))
                .collect(),
        };
        self.containers
            .lock()
            .unwrap()
            .entry(service.to_string())
            .or_default()
            .push(container);
        self
    }

    pub fn failing_query(mut self, network: &str) -> Self {
        self.failing_query.insert(network.to_string());
        self
    }

    pub fn failing_create(mut self, network: &str) -> Self {
        self.failing_create.insert(network.to_string());
        self
    }

    pub fn failing_remove(mut self, container: &str) -> Self {
        self.failing_remove.insert(container.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the networks created, in order
    pub fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::CreateNetwork(name, _) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// IDs of the containers removed, in order
    pub fn removed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::RemoveContainer(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Current id of the network called `name`
    pub fn network(&self, name: &str) -> Option<String> {
        self.networks.lock().unwrap().get(name).cloned()
    }

    fn record(&self, call: RuntimeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn network_id(&self, name: &str) -> Result<Option<String>> {
        self.record(RuntimeCall::NetworkId(name.to_string()));
        if self.failing_query.contains(name) {
            return Err(DevError::NetworkQuery {
                name: name.to_string(),
                message: "Cannot connect to the Docker daemon".to_string(),
            });
        }
        Ok(self.network(name))
    }

    async fn create_network(&self, name: &str, options: &NetworkOptions) -> Result<String> {
        self.record(RuntimeCall::CreateNetwork(name.to_string(), options.clone()));
        if self.failing_create.contains(name) {
            return Err(DevError::NetworkCreate {
                name: name.to_string(),
                message: "Pool overlaps with other one on this address space".to_string(),
            });
        }

        let mut networks = self.networks.lock().unwrap();
        let id = format!("net-{}-{}", name, networks.len() + 1);
        networks.insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn service_containers(&self, project: &str, service: &str) -> Result<Vec<ContainerNetworks>> {
        self.record(RuntimeCall::ServiceContainers {
            project: project.to_string(),
            service: service.to_string(),
        });
        Ok(self
            .containers
            .lock()
            .unwrap()
            .get(service)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.record(RuntimeCall::RemoveContainer(id.to_string()));
        if self.failing_remove.contains(id) {
            return Err(DevError::ContainerRemove {
                id: id.to_string(),
                message: "removal already in progress".to_string(),
            });
        }
        Ok(())
    }
}

/// Registry client that fails for a configured set of registry names
#[derive(Default)]
pub struct FakeRegistry {
    failing: BTreeSet<String>,
    logins: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, registry: &str) -> Self {
        self.failing.insert(registry.to_string());
        self
    }

    /// Names of the registries a login was attempted for, in order
    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn login(&self, registry: &RegistryConfig) -> Result<()> {
        self.logins.lock().unwrap().push(registry.name.clone());
        if self.failing.contains(&registry.name) {
            return Err(DevError::RegistryLogin {
                registry: registry.name.clone(),
                message: "unauthorized: incorrect username or password".to_string(),
            });
        }
        Ok(())
    }
}

/// Compose runner returning queued exit codes (0 once the queue is empty)
#[derive(Default)]
pub struct FakeCompose {
    exit_codes: Mutex<VecDeque<i32>>,
    invocations: Mutex<Vec<ComposeInvocation>>,
}

impl FakeCompose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exiting_with(self, code: i32) -> Self {
        self.exit_codes.lock().unwrap().push_back(code);
        self
    }

    pub fn invocations(&self) -> Vec<ComposeInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComposeRunner for FakeCompose {
    async fn run(&self, invocation: &ComposeInvocation) -> Result<i32> {
        self.invocations.lock().unwrap().push(invocation.clone());
        Ok(self.exit_codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}
