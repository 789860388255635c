//! Boids flocking simulation.
//!
//! Each tick the world rebuilds a quadtree from the current boid positions,
//! asks it for every boid's neighbors and lets each boid steer. Rendering is
//! left to the caller; [`World::index`] exposes the tree for debug drawing.

pub mod boid;
pub mod config;
pub mod drift;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod world;

// Re-export commonly used types
pub use boid::Boid;
pub use config::Config;
pub use drift::DriftField;
pub use error::FlockError;
pub use runner::run;
pub use scenario::{get_scenario, Scenario};
pub use world::{TickStats, World, WorldBorder};
