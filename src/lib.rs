//! devstack - bring up local multi-container development environments
//!
//! devstack wraps docker compose with the chores that have to happen before
//! a project can start:
//!
//! - Logging in to private container registries
//! - Creating shared networks declared outside any compose project
//! - Removing containers that still reference a network from before a reboot
//!
//! It then runs `docker compose up -d` for the project and follows its logs.

pub mod compose;
pub mod config;
pub mod container;
pub mod error;
pub mod network;
pub mod registry;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use error::{DevError, Outcome, Result};
