//! World state management.
//!
//! Owns the boids and the spatial index that is rebuilt from them every
//! tick.

use crate::boid::{Boid, SPEED};
use crate::config::Config;
use crate::error::FlockError;
use glam::Vec2;
use quadtree::{Aabb, QuadTree};
use rand::Rng;
use std::time::{Duration, Instant};

/// How far inside the opposite edge a wrapped coordinate lands.
pub const WRAP_EPSILON: f32 = 1e-3;

/// World border bounds, centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct WorldBorder {
    bounds: Aabb,
}

impl WorldBorder {
    /// Each side must be wider than the two wrap margins.
    pub fn new(width: f32, height: f32) -> Result<Self, FlockError> {
        if !(width > 2.0 * WRAP_EPSILON && height > 2.0 * WRAP_EPSILON) {
            return Err(FlockError::InvalidConfig(format!(
                "border {width}x{height} must be larger than {} on each side",
                2.0 * WRAP_EPSILON
            )));
        }
        let half = Vec2::new(width, height) / 2.0;
        Ok(Self {
            bounds: Aabb::new(-half, half)?,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Get a random position strictly inside the border.
    #[inline]
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let min = self.bounds.min() + WRAP_EPSILON;
        let max = self.bounds.max() - WRAP_EPSILON;
        Vec2::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y))
    }

    /// Move a coordinate that reached or crossed an edge to just inside the
    /// opposite edge. Coordinates strictly inside are left alone.
    #[inline]
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        let wrap_axis = |v: f32, lo: f32, hi: f32| {
            if v <= lo {
                hi - WRAP_EPSILON
            } else if v >= hi {
                lo + WRAP_EPSILON
            } else {
                v
            }
        };
        Vec2::new(wrap_axis(position.x, min.x, max.x), wrap_axis(position.y, min.y, max.y))
    }
}

/// Per-tick statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    pub tick: u64,
    /// Entities in the simulation.
    pub entities: usize,
    /// Entities held by the index after this tick's rebuild.
    pub indexed: usize,
    pub leaves: usize,
    pub depth: u32,
    /// Average neighbors seen per entity, self excluded.
    pub mean_neighbors: f32,
    pub elapsed: Duration,
}

/// The flocking world.
#[derive(Debug)]
pub struct World {
    /// All boids, in spawn order.
    pub boids: Vec<Boid>,
    /// World border.
    pub border: WorldBorder,
    /// Snapshot of the boids as of the start of the current tick.
    index: QuadTree<Boid>,
    perception_radius: f32,
    next_id: u32,
    tick_count: u64,
}

impl World {
    /// Create an empty world from configuration.
    pub fn new(config: &Config) -> Result<Self, FlockError> {
        let border = WorldBorder::new(config.border.width, config.border.height)?;
        let index = QuadTree::new(border.bounds(), config.index.max_elements)?
            .with_containment(config.index.containment.into());
        Ok(Self {
            boids: Vec::with_capacity(config.boids.count),
            border,
            index,
            perception_radius: config.boids.perception_radius,
            next_id: 0,
            tick_count: 0,
        })
    }

    /// Add a boid, assigning it the next ID. Its position is wrapped into
    /// the border first.
    pub fn add_boid(&mut self, position: Vec2, heading: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let boid = Boid::new(id, self.border.wrap(position))
            .with_heading(heading)
            .with_perception_radius(self.perception_radius);
        self.boids.push(boid);
        id
    }

    /// Spawn `count` boids at random positions with random full-speed headings.
    pub fn spawn_random<R: Rng>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            let position = self.border.random_position(rng);
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            self.add_boid(position, Vec2::from_angle(angle) * SPEED);
        }
    }

    /// Ticks run so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Index as built by the last tick, for rendering.
    #[inline]
    pub fn index(&self) -> &QuadTree<Boid> {
        &self.index
    }

    /// Rebuild the index from the current boids. Returns how many boids
    /// the finished index holds.
    pub fn rebuild_index(&mut self) -> usize {
        self.index.clear();
        self.index.insert_all(self.boids.iter().copied());
        // Not the insert_all count: with open containment a split can drop
        // boids that were accepted earlier.
        self.index.len()
    }

    /// Run one simulation step.
    ///
    /// Every boid sees its neighbors as they were at the start of the tick,
    /// so update order does not matter.
    pub fn tick(&mut self) -> TickStats {
        let tick_start = Instant::now();
        self.tick_count += 1;

        let indexed = self.rebuild_index();

        let mut neighbors: Vec<&Boid> = Vec::with_capacity(64);
        let mut neighbor_total = 0usize;
        for boid in &mut self.boids {
            neighbors.clear();
            self.index.radial_query_into(boid.position, boid.query_radius(), &mut neighbors);
            neighbor_total += neighbors.iter().filter(|n| n.id != boid.id).count();

            boid.update(&neighbors);
            boid.position = self.border.wrap(boid.position);
        }

        let entities = self.boids.len();
        TickStats {
            tick: self.tick_count,
            entities,
            indexed,
            leaves: self.index.leaf_count(),
            depth: self.index.depth(),
            mean_neighbors: if entities == 0 { 0.0 } else { neighbor_total as f32 / entities as f32 },
            elapsed: tick_start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainmentMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.border.width = 4.0;
        config.border.height = 4.0;
        config.index.max_elements = 4;
        config
    }

    #[test]
    fn test_border_rejects_bad_size() {
        assert!(WorldBorder::new(0.0, 10.0).is_err());
        assert!(WorldBorder::new(10.0, -1.0).is_err());
        assert!(WorldBorder::new(f32::NAN, 10.0).is_err());
        // No room left between the wrap margins.
        let err = WorldBorder::new(0.001, 0.001).unwrap_err();
        assert!(matches!(err, FlockError::InvalidConfig(_)));
        assert!(WorldBorder::new(2.0 * WRAP_EPSILON, 10.0).is_err());
    }

    #[test]
    fn test_tiny_border_spawns_inside() {
        let border = WorldBorder::new(0.01, 0.01).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            assert!(border.bounds().contains(border.random_position(&mut rng)));
        }
        assert!(border.bounds().contains(border.wrap(Vec2::new(1.0, -1.0))));
    }

    #[test]
    fn test_wrap_to_opposite_edge() {
        let border = WorldBorder::new(20.0, 20.0).unwrap();
        let inside = Vec2::new(3.0, -4.0);
        assert_eq!(border.wrap(inside), inside);

        let right = border.wrap(Vec2::new(10.2, 1.0));
        assert_eq!(right, Vec2::new(-10.0 + WRAP_EPSILON, 1.0));
        let left = border.wrap(Vec2::new(-10.0, 1.0));
        assert_eq!(left, Vec2::new(10.0 - WRAP_EPSILON, 1.0));
        let corner = border.wrap(Vec2::new(11.0, -11.0));
        assert_eq!(corner, Vec2::new(-10.0 + WRAP_EPSILON, 10.0 - WRAP_EPSILON));

        for p in [right, left, corner] {
            assert!(border.bounds().contains(p));
        }
    }

    #[test]
    fn test_random_positions_inside() {
        let border = WorldBorder::new(2.0, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(border.bounds().contains(border.random_position(&mut rng)));
        }
    }

    #[test]
    fn test_spawn_assigns_ids_and_speed() {
        let mut world = World::new(&small_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        world.spawn_random(20, &mut rng);

        assert_eq!(world.boids.len(), 20);
        for (i, boid) in world.boids.iter().enumerate() {
            assert_eq!(boid.id, i as u32);
            assert!((boid.heading.length() - SPEED).abs() < 1e-5);
            assert!(world.border.bounds().contains(boid.position));
        }
    }

    #[test]
    fn test_tick_indexes_every_boid() {
        let mut world = World::new(&small_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        world.spawn_random(200, &mut rng);

        for expected_tick in 1..=25 {
            let stats = world.tick();
            assert_eq!(stats.tick, expected_tick);
            assert_eq!(stats.entities, 200);
            assert_eq!(stats.indexed, 200);
            assert!(stats.leaves >= 4, "200 boids must split a 4-capacity root");
            assert!(world.boids.iter().all(|b| world.border.bounds().contains(b.position)));
            assert!(world.boids.iter().all(|b| b.heading.length() <= SPEED + 1e-5));
        }
        assert_eq!(world.tick_count(), 25);
    }

    #[test]
    fn test_tick_uses_start_of_tick_snapshot() {
        let build = |order_reversed: bool| {
            let mut world = World::new(&small_config()).unwrap();
            let mut spawns = vec![
                (Vec2::new(0.0, 0.0), Vec2::new(0.1, 0.0)),
                (Vec2::new(0.05, 0.0), Vec2::new(0.0, 0.1)),
                (Vec2::new(0.2, 0.1), Vec2::new(-0.1, 0.0)),
            ];
            if order_reversed {
                spawns.reverse();
            }
            for (p, h) in spawns {
                world.add_boid(p, h);
            }
            world.tick();
            let mut result: Vec<(Vec2, Vec2)> = world.boids.iter().map(|b| (b.position, b.heading)).collect();
            result.sort_by(|a, b| a.0.x.total_cmp(&b.0.x).then(a.0.y.total_cmp(&b.0.y)));
            result
        };
        assert_eq!(build(false), build(true));
    }

    #[test]
    fn test_neighbor_stats_exclude_self() {
        let mut world = World::new(&small_config()).unwrap();
        world.add_boid(Vec2::new(-1.5, -1.5), Vec2::ZERO);
        world.add_boid(Vec2::new(1.5, 1.5), Vec2::ZERO);
        let stats = world.tick();
        assert_eq!(stats.mean_neighbors, 0.0);

        world.add_boid(Vec2::new(1.6, 1.5), Vec2::ZERO);
        let stats = world.tick();
        assert!((stats.mean_neighbors - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_containment_world() {
        let mut config = small_config();
        config.index.containment = ContainmentMode::Open;
        let mut world = World::new(&config).unwrap();
        // Exactly on the vertical split line once the root splits.
        for i in 0..5 {
            world.add_boid(Vec2::new(0.0, -1.5 + i as f32 * 0.7), Vec2::ZERO);
        }
        world.add_boid(Vec2::new(1.0, 1.0), Vec2::ZERO);
        assert_eq!(world.rebuild_index(), 1);
    }
}
