//! Spatial index error types.

use glam::Vec2;
use thiserror::Error;

/// Errors that can occur while constructing a boundary or an index.
///
/// Once constructed, nothing in the index fails: out-of-bound inserts are
/// dropped and empty queries return empty results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuadTreeError {
    #[error("Invalid boundary: min {min} must be strictly less than max {max} on both axes")]
    InvalidBoundary { min: Vec2, max: Vec2 },

    #[error("Invalid capacity: a node must hold at least one element")]
    InvalidCapacity,

    #[error("Invalid level {level}: must not exceed {max}")]
    InvalidLevel { level: u32, max: u32 },
}
