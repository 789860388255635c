//! Axis-aligned bounding box used as the boundary of every quadtree node.

use crate::error::QuadTreeError;
use glam::Vec2;

/// How a node decides whether a point belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Containment {
    /// Strictly inside all four edges. A point lying on any node edge,
    /// including the split lines between siblings, belongs to no node and
    /// is dropped on insert.
    Open,
    /// Min edges inclusive, max edges exclusive. Sibling quadrants partition
    /// the parent exactly, so only points on the root's max edges are lost.
    #[default]
    HalfOpen,
}

/// Axis-aligned bounding box.
///
/// `min` is the top-left corner and `max` the bottom-right corner: y grows
/// downwards, so the "north" half of a box is the half with the smaller y.
/// Both axes satisfy `min < max`; the box is immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Create a box from its top-left and bottom-right corners.
    pub fn new(min: Vec2, max: Vec2) -> Result<Self, QuadTreeError> {
        let finite = min.is_finite() && max.is_finite();
        if !finite || min.x >= max.x || min.y >= max.y {
            return Err(QuadTreeError::InvalidBoundary { min, max });
        }
        Ok(Self { min, max })
    }

    /// Create a box from its center and half extents.
    #[inline]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Result<Self, QuadTreeError> {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Top-left corner.
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Bottom-right corner.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Get the width of the box.
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Get the height of the box.
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Get the center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Check if the point lies strictly inside all four edges.
    ///
    /// A point touching any edge is rejected.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// Check if the point lies inside, counting the top and left edges but
    /// not the bottom and right ones.
    #[inline]
    pub fn contains_half_open(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Containment test selected by `rule`.
    #[inline]
    pub fn contains_with(&self, point: Vec2, rule: Containment) -> bool {
        match rule {
            Containment::Open => self.contains(point),
            Containment::HalfOpen => self.contains_half_open(point),
        }
    }

    /// Cheap, permissive rectangle/circle test.
    ///
    /// Accepts the circle when its center is inside the box (edges included)
    /// or when any edge lies closer than `radius` along its axis. Every
    /// circle that truly overlaps the box is accepted; some circles that only
    /// pass near a corner, or run alongside an edge's extension, are accepted
    /// too. Callers filter exact distances afterwards.
    #[inline]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let inside = center.x >= self.min.x
            && center.x <= self.max.x
            && center.y >= self.min.y
            && center.y <= self.max.y;
        if inside {
            return true;
        }

        let dist_min_x = (self.min.x - center.x).abs();
        let dist_max_x = (self.max.x - center.x).abs();
        let dist_min_y = (self.min.y - center.y).abs();
        let dist_max_y = (self.max.y - center.y).abs();

        dist_min_x < radius || dist_max_x < radius || dist_min_y < radius || dist_max_y < radius
    }

    /// Split into four equal quadrants around the center.
    ///
    /// Order is fixed: northwest, northeast, southeast, southwest.
    pub fn split(&self) -> [Aabb; 4] {
        let c = self.center();
        let (min, max) = (self.min, self.max);
        [
            Self { min, max: c },
            Self { min: Vec2::new(c.x, min.y), max: Vec2::new(max.x, c.y) },
            Self { min: c, max },
            Self { min: Vec2::new(min.x, c.y), max: Vec2::new(c.x, max.y) },
        ]
    }
}
