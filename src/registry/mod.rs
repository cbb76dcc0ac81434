//! Container registry login
//!
//! Compose pulls images through the docker daemon, which reads credentials
//! from the docker credential store. Logging in ahead of `up` lets projects
//! use images from private registries.

pub mod config;
pub mod login;

pub use config::RegistryConfig;
pub use login::{login_registries, DockerLogin, RegistryClient};
