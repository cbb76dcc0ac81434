//! Remove containers holding stale network references

use crate::compose::{merged_network_names, ComposeConfig, ComposeParser};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::network::NetworkIdMap;
use crate::runtime::ContainerRuntime;
use std::collections::BTreeMap;

/// Declared network name to the project services attached to it
pub type NetworkServiceMap = BTreeMap<String, Vec<String>>;

/// Map each declared network to the services that use it.
///
/// Network keys resolve against the renames of all files together, so an
/// override file can attach a service to a network the base file renames.
/// Networks not in `network_ids` are ignored. Services keep the order they
/// are first seen in; a service repeated by an override file is listed once.
pub fn network_service_map<'a>(
    configs: impl IntoIterator<Item = &'a ComposeConfig> + Clone,
    network_ids: &NetworkIdMap,
) -> NetworkServiceMap {
    let names = merged_network_names(configs.clone());
    let mut map = NetworkServiceMap::new();

    for config in configs {
        for (service, networks) in config.service_networks(&names) {
            for network in networks {
                if !network_ids.contains_key(&network) {
                    continue;
                }
                let services = map.entry(network).or_default();
                if !services.contains(&service) {
                    services.push(service.clone());
                }
            }
        }
    }

    map
}

/// Remove the containers of `project` that reference a declared network by
/// an outdated identifier.
///
/// `compose_project` is the name compose labels the containers with. Returns
/// the IDs of the removed containers. Nothing is parsed or queried when no
/// networks are declared.
pub async fn verify(
    runtime: &dyn ContainerRuntime,
    project: &ProjectConfig,
    compose_project: &str,
    network_ids: &NetworkIdMap,
) -> Result<Vec<String>> {
    if network_ids.is_empty() {
        tracing::debug!("No declared networks, skipping container verification");
        return Ok(Vec::new());
    }

    let env = ComposeParser::project_environment(&project.directory)?;
    let configs = project
        .compose_paths()
        .iter()
        .map(|path| ComposeParser::parse_file(path, &env))
        .collect::<Result<Vec<_>>>()?;

    let services = network_service_map(&configs, network_ids);
    remove_stale_containers(runtime, compose_project, network_ids, &services).await
}

/// Remove every container of the mapped services whose stored id for the
/// network differs from the current one
pub async fn remove_stale_containers(
    runtime: &dyn ContainerRuntime,
    compose_project: &str,
    network_ids: &NetworkIdMap,
    services: &NetworkServiceMap,
) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for (network, service_names) in services {
        let Some(network_id) = network_ids.get(network) else {
            continue;
        };

        for service in service_names {
            for container in runtime.service_containers(compose_project, service).await? {
                if !container.is_stale(network, network_id) || removed.contains(&container.id) {
                    continue;
                }

                runtime.remove_container(&container.id).await?;
                tracing::info!(
                    "Removed container {} ({}): network {} was recreated as {}",
                    container.name,
                    container.id,
                    network,
                    network_id
                );
                removed.push(container.id);
            }
        }
    }

    Ok(removed)
}
