//! Ensure declared networks exist

use super::config::NetworkOptions;
use crate::error::Result;
use crate::runtime::ContainerRuntime;
use std::collections::BTreeMap;

/// Network name to the identifier the runtime assigned it.
///
/// Rebuilt on every run: networks do not survive a host reboot, so a stored
/// identifier could already be dead.
pub type NetworkIdMap = BTreeMap<String, String>;

/// Create every declared network that does not exist yet.
///
/// Returns the identifier of every declared network. Any query or create
/// failure aborts the whole operation.
pub async fn ensure_networks(
    runtime: &dyn ContainerRuntime,
    declarations: &BTreeMap<String, NetworkOptions>,
) -> Result<NetworkIdMap> {
    let mut ids = NetworkIdMap::new();

    for (name, options) in declarations {
        let id = match runtime.network_id(name).await? {
            Some(id) => {
                tracing::debug!("Network {} already exists with id {}", name, id);
                id
            }
            None => {
                let id = runtime.create_network(name, options).await?;
                tracing::info!("Created {} network {}", name, id);
                id
            }
        };
        ids.insert(name.clone(), id);
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevError;
    use crate::testing::{FakeRuntime, RuntimeCall};

    fn declarations(names: &[&str]) -> BTreeMap<String, NetworkOptions> {
        names
            .iter()
            .map(|n| (n.to_string(), NetworkOptions::new().subnet("172.30.0.0/16")))
            .collect()
    }

    #[tokio::test]
    async fn test_existing_networks_are_reused() {
        let runtime = FakeRuntime::new()
            .with_network("shared", "existing-shared")
            .with_network("metrics", "existing-metrics");

        let ids = ensure_networks(&runtime, &declarations(&["shared", "metrics"]))
            .await
            .unwrap();

        assert_eq!(ids.get("shared").map(String::as_str), Some("existing-shared"));
        assert_eq!(ids.get("metrics").map(String::as_str), Some("existing-metrics"));
        assert!(runtime.created().is_empty());
    }

    #[tokio::test]
    async fn test_absent_networks_are_created_once() {
        let runtime = FakeRuntime::new().with_network("shared", "existing-shared");

        let ids = ensure_networks(&runtime, &declarations(&["shared", "metrics", "tracing"]))
            .await
            .unwrap();

        assert_eq!(runtime.created(), vec!["metrics".to_string(), "tracing".to_string()]);
        assert_eq!(ids.len(), 3);
        assert_eq!(ids.get("shared").map(String::as_str), Some("existing-shared"));
        assert_eq!(ids.get("metrics"), runtime.network("metrics").as_ref());
        assert_eq!(ids.get("tracing"), runtime.network("tracing").as_ref());
        assert_ne!(ids.get("metrics"), ids.get("tracing"));
    }

    #[tokio::test]
    async fn test_created_network_receives_declared_options() {
        let runtime = FakeRuntime::new();
        let decls = declarations(&["shared"]);

        ensure_networks(&runtime, &decls).await.unwrap();

        assert_eq!(
            runtime.calls(),
            vec![
                RuntimeCall::NetworkId("shared".to_string()),
                RuntimeCall::CreateNetwork("shared".to_string(), decls["shared"].clone()),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_failure_is_fatal() {
        let runtime = FakeRuntime::new().failing_query("metrics");

        let err = ensure_networks(&runtime, &declarations(&["metrics", "shared"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DevError::NetworkQuery { .. }));
        assert!(runtime.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal() {
        let runtime = FakeRuntime::new().failing_create("shared");

        let err = ensure_networks(&runtime, &declarations(&["shared"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DevError::NetworkCreate { ref name, .. } if name == "shared"));
    }

    #[tokio::test]
    async fn test_no_declarations() {
        let runtime = FakeRuntime::new();
        let ids = ensure_networks(&runtime, &BTreeMap::new()).await.unwrap();
        assert!(ids.is_empty());
        assert!(runtime.calls().is_empty());
    }
}
