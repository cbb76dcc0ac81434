//! Container reconciliation
//!
//! Containers outlive the networks they were created against: after a host
//! reboot declared networks come back with new identifiers, and compose
//! cannot start a container still pointing at the old one.

pub mod reconcile;

pub use reconcile::{network_service_map, remove_stale_containers, verify, NetworkServiceMap};
