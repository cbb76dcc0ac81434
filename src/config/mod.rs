//! Configuration
//!
//! Networks, registries and projects are declared in YAML files and loaded
//! into a [`DevConfig`] that is passed by reference to every operation.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, CONFIG_ENV_VAR, CONFIG_FILE_NAMES};
pub use types::{DevConfig, ProjectConfig};
