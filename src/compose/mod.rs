//! Docker Compose integration
//!
//! Compose files are parsed just far enough to learn which networks each
//! service uses; starting containers and following logs is delegated to the
//! compose CLI.

pub mod config;
pub mod orchestrator;
pub mod parser;
pub mod runner;

pub use config::{merged_network_names, ComposeConfig, NetworkNames, ServiceConfig};
pub use orchestrator::{ComposeOrchestrator, Stage, UpReport};
pub use parser::ComposeParser;
pub use runner::{ComposeCli, ComposeInvocation, ComposeRunner};
