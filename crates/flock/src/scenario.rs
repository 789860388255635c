//! Runnable simulations behind a common interface.

use crate::config::{Config, ScenarioKind};
use crate::drift::DriftField;
use crate::error::FlockError;
use crate::world::{TickStats, World};
use rand::Rng;

/// A simulation the runner can drive one tick at a time.
pub trait Scenario: Send {
    fn name(&self) -> &str;

    /// Number of simulated entities.
    fn entity_count(&self) -> usize;

    /// Advance one tick.
    fn tick(&mut self) -> TickStats;
}

impl Scenario for World {
    fn name(&self) -> &str {
        "flocking"
    }

    fn entity_count(&self) -> usize {
        self.boids.len()
    }

    fn tick(&mut self) -> TickStats {
        World::tick(self)
    }
}

impl Scenario for DriftField {
    fn name(&self) -> &str {
        "drift"
    }

    fn entity_count(&self) -> usize {
        self.points.len()
    }

    fn tick(&mut self) -> TickStats {
        DriftField::tick(self)
    }
}

/// Build and populate the scenario selected in `config`.
pub fn get_scenario<R: Rng>(config: &Config, rng: &mut R) -> Result<Box<dyn Scenario>, FlockError> {
    config.validate()?;
    match config.simulation.scenario {
        ScenarioKind::Flocking => {
            let mut world = World::new(config)?;
            world.spawn_random(config.boids.count, rng);
            Ok(Box::new(world))
        }
        ScenarioKind::Drift => {
            let mut field = DriftField::new(config)?;
            field.spawn_random(config.drift.count, rng);
            Ok(Box::new(field))
        }
    }
}
