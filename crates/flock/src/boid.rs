//! Flocking agent.
//!
//! Steering uses two terms only: alignment with nearby headings and
//! inverse-square separation from very close neighbors. There is no
//! cohesion term.

use glam::Vec2;
use quadtree::Positioned;

/// Maximum magnitude of a single steering term.
pub const MAX_FORCE: f32 = 0.8;
/// Heading magnitude cap, in distance units per tick.
pub const SPEED: f32 = 0.15;
/// Neighbors closer than this repel, regardless of perception radius.
pub const SEPARATION_DISTANCE: f32 = 0.08;
/// Perception radius given to new boids.
pub const DEFAULT_PERCEPTION_RADIUS: f32 = 0.4;

/// A single flocking agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    /// Identity used to skip self in neighbor lists.
    pub id: u32,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Direction of travel; its length is the distance moved per tick.
    pub heading: Vec2,
    /// Steering applied during the last update.
    pub acceleration: Vec2,
    /// Neighbors closer than this are aligned with.
    pub perception_radius: f32,
}

impl Boid {
    /// Create a resting boid.
    pub fn new(id: u32, position: Vec2) -> Self {
        Self {
            id,
            position,
            heading: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            perception_radius: DEFAULT_PERCEPTION_RADIUS,
        }
    }

    /// Set the initial heading.
    pub fn with_heading(mut self, heading: Vec2) -> Self {
        self.heading = heading;
        self
    }

    /// Set the perception radius.
    pub fn with_perception_radius(mut self, radius: f32) -> Self {
        self.perception_radius = radius;
        self
    }

    /// Radius of the neighbor query issued for this boid each tick.
    #[inline]
    pub fn query_radius(&self) -> f32 {
        2.0 * self.perception_radius
    }

    /// Advance one tick.
    ///
    /// Position integrates the heading from the previous tick, then the
    /// heading takes the new steering and is capped at [`SPEED`]. Keeping
    /// the result inside the world is the caller's job.
    pub fn update(&mut self, neighbors: &[&Boid]) {
        let alignment = self.alignment(neighbors);
        let separation = self.separation(neighbors);

        self.acceleration = Vec2::ZERO;
        self.acceleration += alignment;
        self.acceleration += separation;

        self.position += self.heading;
        self.heading += self.acceleration;
        self.heading = limit_magnitude(self.heading, SPEED);
    }

    /// Steering toward the average heading of neighbors within the
    /// perception radius. Zero when there are none.
    pub fn alignment(&self, neighbors: &[&Boid]) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;
        for other in self.others(neighbors) {
            if self.position.distance(other.position) < self.perception_radius {
                sum += other.heading;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        self.steer(sum / count as f32)
    }

    /// Steering away from neighbors closer than [`SEPARATION_DISTANCE`].
    /// Zero when there are none.
    pub fn separation(&self, neighbors: &[&Boid]) -> Vec2 {
        let repulsion = self.repulsion(neighbors);
        if repulsion == Vec2::ZERO {
            return Vec2::ZERO;
        }
        self.steer(repulsion)
    }

    /// Averaged inverse-square push away from close neighbors, before it is
    /// turned into a steering force.
    ///
    /// A neighbor sharing this boid's exact position has no direction to
    /// push along and is ignored.
    pub fn repulsion(&self, neighbors: &[&Boid]) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;
        for other in self.others(neighbors) {
            let diff = self.position - other.position;
            let dist_sq = diff.length_squared();
            if dist_sq > 0.0 && dist_sq < SEPARATION_DISTANCE * SEPARATION_DISTANCE {
                sum += diff / dist_sq;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        sum / count as f32
    }

    /// Reynolds steering: desired velocity at full speed minus current
    /// heading, capped at [`MAX_FORCE`].
    #[inline]
    fn steer(&self, desired: Vec2) -> Vec2 {
        limit_magnitude(set_magnitude(desired, SPEED) - self.heading, MAX_FORCE)
    }

    #[inline]
    fn others<'a>(&self, neighbors: &'a [&'a Boid]) -> impl Iterator<Item = &'a Boid> + use<'a> {
        let id = self.id;
        neighbors.iter().copied().filter(move |other| other.id != id)
    }
}

impl Positioned for Boid {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Scale `vec` down to `limit` if it is longer.
#[inline]
pub fn limit_magnitude(vec: Vec2, limit: f32) -> Vec2 {
    vec.clamp_length_max(limit)
}

/// Scale `vec` to exactly `magnitude`. A zero vector stays zero.
#[inline]
pub fn set_magnitude(vec: Vec2, magnitude: f32) -> Vec2 {
    vec.normalize_or_zero() * magnitude
}
