//! Drifting point field.
//!
//! Bare points slide diagonally at a constant velocity and wrap at the
//! border. Useful for watching the index split and re-split as density moves.

use crate::config::Config;
use crate::error::FlockError;
use crate::world::{TickStats, WorldBorder};
use glam::Vec2;
use quadtree::QuadTree;
use rand::Rng;
use std::time::Instant;

/// A field of points moving in lockstep.
#[derive(Debug)]
pub struct DriftField {
    pub points: Vec<Vec2>,
    pub velocity: Vec2,
    pub border: WorldBorder,
    index: QuadTree<Vec2>,
    tick_count: u64,
}

impl DriftField {
    /// Create an empty field from configuration.
    pub fn new(config: &Config) -> Result<Self, FlockError> {
        let border = WorldBorder::new(config.border.width, config.border.height)?;
        let index = QuadTree::new(border.bounds(), config.index.max_elements)?
            .with_containment(config.index.containment.into());
        Ok(Self {
            points: Vec::with_capacity(config.drift.count),
            velocity: Vec2::splat(config.drift.velocity),
            border,
            index,
            tick_count: 0,
        })
    }

    /// Scatter `count` points uniformly inside the border and index them.
    pub fn spawn_random<R: Rng>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            let point = self.border.random_position(rng);
            self.points.push(point);
            self.index.insert(point);
        }
    }

    #[inline]
    pub fn index(&self) -> &QuadTree<Vec2> {
        &self.index
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Move every point, then rebuild the index.
    pub fn tick(&mut self) -> TickStats {
        let tick_start = Instant::now();
        self.tick_count += 1;

        for point in &mut self.points {
            *point = self.border.wrap(*point + self.velocity);
        }

        self.index.clear();
        self.index.insert_all(self.points.iter().copied());

        TickStats {
            tick: self.tick_count,
            entities: self.points.len(),
            indexed: self.index.len(),
            leaves: self.index.leaf_count(),
            depth: self.index.depth(),
            mean_neighbors: 0.0,
            elapsed: tick_start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WRAP_EPSILON;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> Config {
        let mut config = Config::default();
        config.border.width = 2.0;
        config.border.height = 2.0;
        config.index.max_elements = 4;
        config.drift.velocity = 0.25;
        config
    }

    #[test]
    fn test_spawn_indexes_points() {
        let mut field = DriftField::new(&config()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        field.spawn_random(64, &mut rng);
        assert_eq!(field.points.len(), 64);
        assert_eq!(field.index().len(), 64);
        for p in &field.points {
            assert!(field.index().exact_query(*p).contains(&p));
        }
    }

    #[test]
    fn test_points_move_and_wrap() {
        let mut field = DriftField::new(&config()).unwrap();
        field.points = vec![Vec2::new(0.0, 0.0), Vec2::new(0.9, -0.5)];

        let stats = field.tick();
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.indexed, 2);
        assert_eq!(field.points[0], Vec2::new(0.25, 0.25));
        // 0.9 + 0.25 crosses the right edge and reappears on the left.
        assert_eq!(field.points[1], Vec2::new(-1.0 + WRAP_EPSILON, -0.25));
        assert!(field.index().radial_query(Vec2::new(0.25, 0.25), 0.01).len() == 1);
    }

    #[test]
    fn test_index_follows_points() {
        let mut field = DriftField::new(&config()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        field.spawn_random(100, &mut rng);
        for _ in 0..10 {
            let stats = field.tick();
            assert_eq!(stats.indexed, 100);
        }
        assert_eq!(field.tick_count(), 10);
        for p in &field.points {
            assert!(field.index().exact_query(*p).contains(&p));
        }
    }
}
