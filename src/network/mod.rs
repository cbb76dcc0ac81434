//! Network management module
//!
//! Declared networks live outside any compose project, so they are created
//! here before compose runs and referenced by the project as external.

pub mod config;
pub mod manager;

pub use config::{NetworkDriver, NetworkOptions};
pub use manager::{ensure_networks, NetworkIdMap};
