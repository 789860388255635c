//! Region quadtree for 2D point-like elements.
//!
//! This crate contains:
//! - The `Aabb` boundary primitive (containment, circle test, quadrant split)
//! - The `Positioned` capability every indexed element implements
//! - The generic `QuadTree` with exact-point and radius queries

mod aabb;
mod error;
mod tree;

pub use aabb::{Aabb, Containment};
pub use error::QuadTreeError;
pub use tree::{LeafView, Leaves, QuadTree, MAX_LEVEL};

use glam::Vec2;

/// Anything that exposes a 2D position can be stored in a [`QuadTree`].
pub trait Positioned {
    /// Current position of the element.
    fn position(&self) -> Vec2;
}

impl Positioned for Vec2 {
    #[inline]
    fn position(&self) -> Vec2 {
        *self
    }
}

impl<T: Positioned + ?Sized> Positioned for &T {
    #[inline]
    fn position(&self) -> Vec2 {
        (**self).position()
    }
}
