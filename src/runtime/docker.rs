//! Docker CLI backed runtime

use super::command::{capture, CommandOutput};
use super::{ContainerNetworks, ContainerRuntime, COMPOSE_PROJECT_LABEL, COMPOSE_SERVICE_LABEL};
use crate::error::{DevError, Result};
use crate::network::NetworkOptions;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Default docker binary
pub const DEFAULT_DOCKER_COMMAND: &str = "docker";

/// Runtime that shells out to the `docker` CLI
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_COMMAND)
    }
}

impl DockerCli {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// The docker binary this runtime invokes
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn docker(&self, args: Vec<String>) -> Result<CommandOutput> {
        capture(&self.program, &args, None).await
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn network_id(&self, name: &str) -> Result<Option<String>> {
        let output = self
            .docker(args(&["network", "ls", "--no-trunc", "--format", "{{.ID}}\t{{.Name}}"]))
            .await
            .map_err(|e| DevError::NetworkQuery {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        if !output.success {
            return Err(DevError::NetworkQuery {
                name: name.to_string(),
                message: output.message(),
            });
        }

        Ok(find_network(&output.stdout, name))
    }

    async fn create_network(&self, name: &str, options: &NetworkOptions) -> Result<String> {
        let output = self
            .docker(options.create_args(name))
            .await
            .map_err(|e| DevError::NetworkCreate {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let id = output.stdout.trim();
        if !output.success || id.is_empty() {
            return Err(DevError::NetworkCreate {
                name: name.to_string(),
                message: output.message(),
            });
        }

        Ok(id.to_string())
    }

    async fn service_containers(&self, project: &str, service: &str) -> Result<Vec<ContainerNetworks>> {
        let query_error = |message: String| DevError::ContainerQuery {
            service: service.to_string(),
            message,
        };

        let output = self
            .docker(service_filter_args(project, service))
            .await
            .map_err(|e| query_error(e.to_string()))?;
        if !output.success {
            return Err(query_error(output.message()));
        }

        let ids: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut inspect = args(&["container", "inspect"]);
        inspect.extend(ids);

        let output = self
            .docker(inspect)
            .await
            .map_err(|e| query_error(e.to_string()))?;
        if !output.success {
            return Err(query_error(output.message()));
        }

        parse_inspect(&output.stdout)
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let output = self
            .docker(args(&["container", "rm", "--force", id]))
            .await
            .map_err(|e| DevError::ContainerRemove {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        if !output.success {
            return Err(DevError::ContainerRemove {
                id: id.to_string(),
                message: output.message(),
            });
        }

        Ok(())
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Arguments listing every container of one compose service, by ID.
///
/// Compose lowercases the project name it writes into the label.
fn service_filter_args(project: &str, service: &str) -> Vec<String> {
    vec![
        "container".to_string(),
        "ls".to_string(),
        "--all".to_string(),
        "--no-trunc".to_string(),
        "--filter".to_string(),
        format!("label={}={}", COMPOSE_PROJECT_LABEL, project.to_lowercase()),
        "--filter".to_string(),
        format!("label={}={}", COMPOSE_SERVICE_LABEL, service),
        "--format".to_string(),
        "{{.ID}}".to_string(),
    ]
}

/// Find `name` in `docker network ls` output of "<id>\t<name>" lines
fn find_network(listing: &str, name: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let (id, network) = line.trim().split_once('\t')?;
        (network == name).then(|| id.to_string())
    })
}

#[derive(Debug, Deserialize)]
struct InspectedContainer {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "NetworkSettings", default)]
    network_settings: Option<InspectedNetworkSettings>,
}

#[derive(Debug, Deserialize)]
struct InspectedNetworkSettings {
    #[serde(rename = "Networks", default)]
    networks: Option<HashMap<String, InspectedEndpoint>>,
}

#[derive(Debug, Deserialize)]
struct InspectedEndpoint {
    #[serde(rename = "NetworkID", default)]
    network_id: String,
}

/// Parse the JSON array printed by `docker container inspect`
fn parse_inspect(json: &str) -> Result<Vec<ContainerNetworks>> {
    let inspected: Vec<InspectedContainer> = serde_json::from_str(json)?;

    Ok(inspected
        .into_iter()
        .map(|c| {
            let networks: BTreeMap<String, String> = c
                .network_settings
                .and_then(|s| s.networks)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, endpoint)| (name, endpoint.network_id))
                .collect();

            ContainerNetworks {
                id: c.id,
                name: c.name.trim_start_matches('/').to_string(),
                networks,
            }
        })
        .collect())
}
