//! Network declarations

use crate::error::{DevError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Network driver types that can back a user-defined network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    /// Bridge network (default)
    #[default]
    Bridge,
    /// Overlay network (for Swarm)
    Overlay,
    /// Macvlan network
    Macvlan,
    /// IPvlan network
    Ipvlan,
}

impl std::fmt::Display for NetworkDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkDriver::Bridge => write!(f, "bridge"),
            NetworkDriver::Overlay => write!(f, "overlay"),
            NetworkDriver::Macvlan => write!(f, "macvlan"),
            NetworkDriver::Ipvlan => write!(f, "ipvlan"),
        }
    }
}

/// Creation options for a declared network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkOptions {
    /// Network driver
    pub driver: NetworkDriver,
    /// Subnet in CIDR format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Gateway address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Allocate container addresses from this sub-range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<String>,
    /// Internal network (no external access)
    pub internal: bool,
    /// Attachable by standalone containers
    pub attachable: bool,
    /// Enable IPv6
    pub enable_ipv6: bool,
    /// Network labels
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Driver options
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl NetworkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network driver
    pub fn driver(mut self, driver: NetworkDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Set subnet
    pub fn subnet(mut self, subnet: &str) -> Self {
        self.subnet = Some(subnet.to_string());
        self
    }

    /// Set gateway
    pub fn gateway(mut self, gateway: &str) -> Self {
        self.gateway = Some(gateway.to_string());
        self
    }

    /// Add label
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Add driver option
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }

    /// Set internal
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Check the addressing options of the network called `name`
    pub fn validate(&self, name: &str) -> Result<()> {
        if let Some(subnet) = &self.subnet {
            parse_cidr(subnet).map_err(|e| invalid(name, &e))?;
        }
        if let Some(range) = &self.ip_range {
            if self.subnet.is_none() {
                return Err(invalid(name, "ip_range requires a subnet"));
            }
            parse_cidr(range).map_err(|e| invalid(name, &e))?;
        }
        if let Some(gateway) = &self.gateway {
            if self.subnet.is_none() {
                return Err(invalid(name, "gateway requires a subnet"));
            }
            gateway
                .parse::<IpAddr>()
                .map_err(|_| invalid(name, &format!("invalid gateway address '{}'", gateway)))?;
        }
        Ok(())
    }

    /// Arguments for `docker network create` creating this network as `name`
    pub fn create_args(&self, name: &str) -> Vec<String> {
        let mut args = vec![
            "network".to_string(),
            "create".to_string(),
            "--driver".to_string(),
            self.driver.to_string(),
        ];

        if let Some(subnet) = &self.subnet {
            args.push("--subnet".to_string());
            args.push(subnet.clone());
        }
        if let Some(gateway) = &self.gateway {
            args.push("--gateway".to_string());
            args.push(gateway.clone());
        }
        if let Some(range) = &self.ip_range {
            args.push("--ip-range".to_string());
            args.push(range.clone());
        }
        if self.internal {
            args.push("--internal".to_string());
        }
        if self.attachable {
            args.push("--attachable".to_string());
        }
        if self.enable_ipv6 {
            args.push("--ipv6".to_string());
        }
        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }
        for (key, value) in &self.options {
            args.push("--opt".to_string());
            args.push(format!("{}={}", key, value));
        }

        args.push(name.to_string());
        args
    }
}

fn invalid(name: &str, message: &str) -> DevError {
    DevError::Config(format!("network {}: {}", name, message))
}

/// Parse "address/prefix", e.g. "172.30.0.0/16"
fn parse_cidr(cidr: &str) -> std::result::Result<(IpAddr, u8), String> {
    let (addr, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| format!("invalid CIDR '{}'", cidr))?;

    let addr: IpAddr = addr
        .parse()
        .map_err(|_| format!("invalid IP '{}' in '{}'", addr, cidr))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| format!("invalid prefix length in '{}'", cidr))?;

    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(format!("prefix length {} too large in '{}'", prefix, cidr));
    }

    Ok((addr, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_options_default() {
        let options = NetworkOptions::default();
        assert_eq!(options.driver, NetworkDriver::Bridge);
        assert!(options.subnet.is_none());
        assert_eq!(options.create_args("dev"), vec!["network", "create", "--driver", "bridge", "dev"]);
    }

    #[test]
    fn test_network_options_builder() {
        let options = NetworkOptions::new()
            .driver(NetworkDriver::Overlay)
            .subnet("10.0.0.0/24")
            .gateway("10.0.0.1")
            .label("team", "platform")
            .option("com.docker.network.bridge.name", "dev0")
            .internal(true);

        assert_eq!(
            options.create_args("shared"),
            vec![
                "network",
                "create",
                "--driver",
                "overlay",
                "--subnet",
                "10.0.0.0/24",
                "--gateway",
                "10.0.0.1",
                "--internal",
                "--label",
                "team=platform",
                "--opt",
                "com.docker.network.bridge.name=dev0",
                "shared",
            ]
        );
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
driver: macvlan
subnet: 192.168.50.0/24
attachable: true
labels:
  owner: dev
"#;
        let options: NetworkOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.driver, NetworkDriver::Macvlan);
        assert_eq!(options.subnet.as_deref(), Some("192.168.50.0/24"));
        assert!(options.attachable);
        assert_eq!(options.labels.get("owner").map(String::as_str), Some("dev"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<NetworkOptions, _> = serde_yaml::from_str("subnett: 10.0.0.0/8");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(NetworkOptions::new().subnet("172.30.0.0/16").gateway("172.30.0.1").validate("dev").is_ok());
        assert!(NetworkOptions::new().subnet("fd00::/64").validate("dev").is_ok());
        assert!(NetworkOptions::new().subnet("172.30.0.0").validate("dev").is_err());
        assert!(NetworkOptions::new().subnet("172.30.0.0/33").validate("dev").is_err());
        assert!(NetworkOptions::new().gateway("172.30.0.1").validate("dev").is_err());

        let err = NetworkOptions::new()
            .subnet("10.0.0.0/8")
            .gateway("not-an-ip")
            .validate("dev")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: network dev: invalid gateway address 'not-an-ip'");
    }
}
