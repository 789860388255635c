//! Simulation error types.

use quadtree::QuadTreeError;
use thiserror::Error;

/// Errors that can occur while configuring or building a simulation.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Index(#[from] QuadTreeError),
}
