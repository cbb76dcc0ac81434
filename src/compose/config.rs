//! Docker Compose configuration types
//!
//! Only the parts of a compose file the tool reads are modeled: services and
//! the networks they attach to, plus the top-level network declarations that
//! map a compose network key to a real network name. Everything else in the
//! file is ignored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Network compose attaches services to when they declare none
pub const DEFAULT_NETWORK: &str = "default";

/// Compose network key to the runtime network name it stands for
pub type NetworkNames = BTreeMap<String, String>;

/// Docker Compose file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Services
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    /// Networks
    #[serde(default)]
    pub networks: BTreeMap<String, Option<NetworkConfig>>,
}

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Image name
    #[serde(default)]
    pub image: Option<String>,
    /// Container name
    #[serde(default)]
    pub container_name: Option<String>,
    /// Networks to connect to
    #[serde(default)]
    pub networks: Option<NetworksConfig>,
    /// Network mode
    #[serde(default)]
    pub network_mode: Option<String>,
}

/// Service networks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworksConfig {
    /// Array of network names
    Array(Vec<String>),
    /// Map of network name to config
    Map(HashMap<String, Option<ServiceNetworkConfig>>),
}

/// Service network configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceNetworkConfig {
    /// Aliases
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    /// IPv4 address
    pub ipv4_address: Option<String>,
    /// IPv6 address
    pub ipv6_address: Option<String>,
}

/// Top-level network configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Driver
    pub driver: Option<String>,
    /// External network
    pub external: Option<ExternalConfig>,
    /// Name
    pub name: Option<String>,
}

/// External resource configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalConfig {
    /// Boolean
    Bool(bool),
    /// With name (legacy syntax)
    Named { name: String },
}

impl ServiceConfig {
    /// Compose network keys this service attaches to.
    ///
    /// A service without `networks` joins the project's default network,
    /// unless `network_mode` takes it off compose networking entirely.
    pub fn network_keys(&self) -> Vec<String> {
        match &self.networks {
            Some(NetworksConfig::Array(names)) => names.clone(),
            Some(NetworksConfig::Map(map)) => {
                let mut names: Vec<String> = map.keys().cloned().collect();
                names.sort();
                names
            }
            None if self.network_mode.is_some() => Vec::new(),
            None => vec![DEFAULT_NETWORK.to_string()],
        }
    }
}

impl ComposeConfig {
    /// Runtime name of the network a service refers to as `key`.
    ///
    /// `name:` and the legacy `external: { name: }` rename the network; any
    /// other key is taken literally.
    pub fn resolve_network_name(&self, key: &str) -> String {
        let Some(Some(network)) = self.networks.get(key) else {
            return key.to_string();
        };

        match (&network.external, &network.name) {
            (Some(ExternalConfig::Named { name }), _) => name.clone(),
            (_, Some(name)) => name.clone(),
            _ => key.to_string(),
        }
    }

    /// Top-level network keys this file renames, mapped to their runtime names
    pub fn network_names(&self) -> NetworkNames {
        self.networks
            .keys()
            .filter_map(|key| {
                let name = self.resolve_network_name(key);
                (name != *key).then(|| (key.clone(), name))
            })
            .collect()
    }

    /// Each service with the runtime names of the networks it attaches to.
    ///
    /// Keys are looked up in `names`, which holds the renames of every file
    /// of the project; keys missing from it are taken literally.
    pub fn service_networks(&self, names: &NetworkNames) -> Vec<(String, Vec<String>)> {
        self.services
            .iter()
            .map(|(name, service)| {
                let networks = service
                    .network_keys()
                    .into_iter()
                    .map(|key| names.get(&key).cloned().unwrap_or(key))
                    .collect();
                (name.clone(), networks)
            })
            .collect()
    }
}

/// Renames from several compose files, later files winning
pub fn merged_network_names<'a>(configs: impl IntoIterator<Item = &'a ComposeConfig>) -> NetworkNames {
    let mut names = NetworkNames::new();
    for config in configs {
        names.extend(config.network_names());
    }
    names
}
