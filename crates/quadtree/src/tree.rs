//! QuadTree for spatial indexing.
//!
//! A node is either a leaf holding up to `max_elements` elements, or an
//! internal node owning exactly four children (northwest, northeast,
//! southeast, southwest). A leaf splits once when an insert finds it full;
//! nodes never merge back. The only removal path is [`QuadTree::clear`],
//! so the intended use is a full rebuild every tick.

use crate::aabb::{Aabb, Containment};
use crate::error::QuadTreeError;
use crate::Positioned;
use glam::Vec2;

/// Deepest level a node can reach. Nodes at this level never split and
/// accept any number of elements.
pub const MAX_LEVEL: u32 = 8;

/// Region quadtree over elements exposing a 2D position.
///
/// The tree owns copies of the inserted elements (use a reference or a
/// small snapshot type as `T` to index data owned elsewhere).
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    boundary: Aabb,
    max_elements: usize,
    level: u32,
    containment: Containment,
    /// Elements held by this node; always empty on internal nodes.
    elements: Vec<T>,
    /// NW, NE, SE, SW. `None` means this node is a leaf.
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T> QuadTree<T> {
    /// Create an empty root at level 0.
    pub fn new(boundary: Aabb, max_elements: usize) -> Result<Self, QuadTreeError> {
        Self::with_level(boundary, max_elements, 0)
    }

    /// Create an empty node starting at `level`.
    pub fn with_level(boundary: Aabb, max_elements: usize, level: u32) -> Result<Self, QuadTreeError> {
        if max_elements == 0 {
            return Err(QuadTreeError::InvalidCapacity);
        }
        if level > MAX_LEVEL {
            return Err(QuadTreeError::InvalidLevel { level, max: MAX_LEVEL });
        }
        Ok(Self::node(boundary, max_elements, level, Containment::default()))
    }

    /// Select the containment rule used to route elements and query points.
    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.set_containment(containment);
        self
    }

    fn node(boundary: Aabb, max_elements: usize, level: u32, containment: Containment) -> Self {
        Self {
            boundary,
            max_elements,
            level,
            containment,
            elements: Vec::new(),
            children: None,
        }
    }

    fn set_containment(&mut self, containment: Containment) {
        self.containment = containment;
        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                child.set_containment(containment);
            }
        }
    }

    /// Boundary of this node.
    #[inline]
    pub fn boundary(&self) -> Aabb {
        self.boundary
    }

    /// Depth of this node (the root starts at 0 unless built with `with_level`).
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Capacity of a leaf below `MAX_LEVEL`.
    #[inline]
    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    /// Containment rule in use.
    #[inline]
    pub fn containment(&self) -> Containment {
        self.containment
    }

    /// A node is a leaf iff it has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in NW, NE, SE, SW order, if this node has split.
    #[inline]
    pub fn children(&self) -> Option<&[QuadTree<T>; 4]> {
        self.children.as_deref()
    }

    /// Elements held directly by this node.
    #[inline]
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Total number of elements stored in this subtree.
    pub fn len(&self) -> usize {
        self.leaves().map(|leaf| leaf.elements.len()).sum()
    }

    /// Check if the subtree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.leaves().all(|leaf| leaf.elements.is_empty())
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Deepest level reached by any leaf of this subtree.
    pub fn depth(&self) -> u32 {
        self.leaves().map(|leaf| leaf.level).max().unwrap_or(self.level)
    }

    /// Lazily walk every leaf, northwest first, depth first.
    pub fn leaves(&self) -> Leaves<'_, T> {
        Leaves { stack: vec![self] }
    }

    /// Drop every element and every child, leaving an empty leaf.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.children = None;
    }
}

impl<T: Positioned> QuadTree<T> {
    /// Insert an element.
    ///
    /// Returns `false` when the element was dropped because its position is
    /// outside this node (or, with `Containment::Open`, on a split line).
    pub fn insert(&mut self, element: T) -> bool {
        if !self.boundary.contains_with(element.position(), self.containment) {
            return false;
        }
        self.insert_contained(element)
    }

    /// Insert every element independently. Returns how many were stored.
    pub fn insert_all<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        elements.into_iter().map(|e| self.insert(e)).filter(|&stored| stored).count()
    }

    /// Insert an element already known to be inside this node.
    fn insert_contained(&mut self, element: T) -> bool {
        if self.is_leaf() {
            if self.elements.len() < self.max_elements || self.level >= MAX_LEVEL {
                self.elements.push(element);
                return true;
            }
            self.split();
        }

        self.route(element)
    }

    /// Hand an element to the child that contains it.
    fn route(&mut self, element: T) -> bool {
        let pos = element.position();
        let rule = self.containment;
        let Some(children) = self.children.as_deref_mut() else {
            return false;
        };
        match children.iter_mut().find(|c| c.boundary.contains_with(pos, rule)) {
            Some(child) => child.insert_contained(element),
            None => false,
        }
    }

    /// Turn this leaf into an internal node and push its elements down.
    fn split(&mut self) {
        if self.level >= MAX_LEVEL || !self.is_leaf() {
            return;
        }

        let next_level = self.level + 1;
        let [nw, ne, se, sw] = self.boundary.split();
        let (max_elements, containment) = (self.max_elements, self.containment);
        let make = |b| Self::node(b, max_elements, next_level, containment);
        self.children = Some(Box::new([make(nw), make(ne), make(se), make(sw)]));

        let held = std::mem::take(&mut self.elements);
        for element in held {
            self.route(element);
        }
    }

    /// Elements of the leaf containing `point`.
    ///
    /// Only the path from this node to that leaf is visited. A point outside
    /// every node yields an empty result.
    pub fn exact_query(&self, point: Vec2) -> Vec<&T> {
        if !self.boundary.contains_with(point, self.containment) {
            return Vec::new();
        }

        let mut node = self;
        while let Some(children) = node.children.as_deref() {
            match children.iter().find(|c| c.boundary.contains_with(point, self.containment)) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        node.elements.iter().collect()
    }

    /// Every element strictly closer than `radius` to `point`.
    ///
    /// The index has no notion of identity: an element located at `point`
    /// is part of the result.
    pub fn radial_query(&self, point: Vec2, radius: f32) -> Vec<&T> {
        let mut found = Vec::new();
        self.radial_query_into(point, radius, &mut found);
        found
    }

    /// Same as [`radial_query`](Self::radial_query), appending to `out` so a
    /// caller can reuse one buffer across many queries.
    pub fn radial_query_into<'a>(&'a self, point: Vec2, radius: f32, out: &mut Vec<&'a T>) {
        if !self.boundary.intersects_circle(point, radius) {
            return;
        }

        match self.children.as_deref() {
            Some(children) => {
                for child in children {
                    child.radial_query_into(point, radius, out);
                }
            }
            None => {
                out.extend(self.elements.iter().filter(|e| e.position().distance(point) < radius));
            }
        }
    }
}

/// A leaf as seen by a renderer.
#[derive(Debug, Clone, Copy)]
pub struct LeafView<'a, T> {
    /// Boundary of the leaf.
    pub boundary: Aabb,
    /// Depth of the leaf; renderers key debug colors on it.
    pub level: u32,
    /// Elements held by the leaf.
    pub elements: &'a [T],
}

impl<'a, T: Positioned> LeafView<'a, T> {
    /// Positions of the leaf's occupants.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + use<'a, T> {
        self.elements.iter().map(Positioned::position)
    }
}

/// Iterator over the leaves of a [`QuadTree`].
#[derive(Debug)]
pub struct Leaves<'a, T> {
    stack: Vec<&'a QuadTree<T>>,
}

impl<'a, T> Iterator for Leaves<'a, T> {
    type Item = LeafView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children.as_deref() {
                // Reversed so the northwest child is visited first.
                Some(children) => self.stack.extend(children.iter().rev()),
                None => {
                    return Some(LeafView {
                        boundary: node.boundary,
                        level: node.level,
                        elements: &node.elements,
                    });
                }
            }
        }
        None
    }
}
