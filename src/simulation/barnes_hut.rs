//! # Barnes–Hut QuadTree (2D)
//!
//! This module implements a **2D Barnes–Hut quadtree** for approximating
//! gravitational pull in an `N`-body system. The goal is to replace the
//! naive `O(N²)` all-pairs force calculation with an approximate `O(N log N)`
//! method while keeping close encounters exact.
//!
//! ## Core Concepts
//!
//! A group of distant bodies is treated as a single pseudo-body located at
//! their center of mass. For far clusters one interaction replaces many.
//!
//! - The plane is recursively subdivided into 4 regions (quadrants).
//! - Each region becomes a node of the tree, stored in one arena `Vec`.
//! - A leaf holds at most `capacity` bodies (1 for Barnes–Hut), after that it
//!   is split into NW, NE, SW, SE children and its bodies are pushed down.
//! - Each node keeps the total mass and center of mass of everything inserted
//!   beneath it, updated incrementally on every successful insert.
//!
//! Coordinates are screen-space: `y` grows downward, so the "north" children
//! are the ones with the smaller `y`.
//!
//! The tree is a throwaway structure. It is rebuilt from scratch on every
//! force pass and never mutated across frames.

use crate::simulation::forces::ForceLaw;
use crate::simulation::states::NVec2;

/// Subdivision stops at this depth, the leaf then keeps extra bodies.
/// Exactly co-located bodies would otherwise split forever.
pub const MAX_DEPTH: u32 = 48;

/// Quadrant order used for `children`.
pub const NW: usize = 0;
pub const NE: usize = 1;
pub const SW: usize = 2;
pub const SE: usize = 3;

/// The gravitational view of a body: position, mass and contact radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub x: NVec2, // position
    pub m: f64, // mass
    pub radius: f64, // contact radius, 0 for pseudo-bodies
}

/// Axis-aligned rectangle, half-open on its far edges: `[x, x+width) × [y, y+height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Axis-aligned box around every point, grown by `padding` on each side.
    ///
    /// Returns `None` for an empty set, there is nothing to build a tree over.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a NVec2>, padding: f64) -> Option<Self> {
        let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;

        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            any = true;
        }

        if !any {
            return None;
        }

        Some(Self {
            x: min.x - padding,
            y: min.y - padding,
            width: max.x - min.x + 2.0 * padding,
            height: max.y - min.y + 2.0 * padding,
        })
    }

    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Side length used by the opening criterion.
    pub fn size(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn center(&self) -> NVec2 {
        NVec2::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }

    /// Bounds of quadrant `q` (`NW`, `NE`, `SW` or `SE`).
    pub fn quadrant(&self, q: usize) -> Self {
        let hw = 0.5 * self.width;
        let hh = 0.5 * self.height;
        match q {
            NW => Self::new(self.x, self.y, hw, hh),
            NE => Self::new(self.x + hw, self.y, hw, hh),
            SW => Self::new(self.x, self.y + hh, hw, hh),
            _ => Self::new(self.x + hw, self.y + hh, hw, hh),
        }
    }

    /// Quadrant a point falls in by comparing against the center.
    /// Only used when rounding leaves a point outside all four child boxes.
    fn quadrant_of(&self, p: &NVec2) -> usize {
        let c = self.center();
        match (p.x >= c.x, p.y >= c.y) {
            (false, false) => NW,
            (true, false) => NE,
            (false, true) => SW,
            (true, true) => SE,
        }
    }
}

/// A single quadtree node.
///
/// Each node is either:
/// - a leaf (`children == None`) holding up to `capacity` body indices, or
/// - an internal node with exactly four children and no direct bodies.
///
/// `mass` / `com` always cover every body inserted beneath the node.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub bounds: Bounds,
    pub mass: f64,
    pub com: NVec2,
    pub children: Option<[usize; 4]>, // indices into QuadTree::nodes, NW NE SW SE
    pub bodies: Vec<usize>, // indices into QuadTree::bodies, leaves only
    pub depth: u32,
}

impl QuadNode {
    fn empty(bounds: Bounds, depth: u32) -> Self {
        Self {
            bounds,
            mass: 0.0,
            com: NVec2::zeros(),
            children: None,
            bodies: Vec::new(),
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A complete 2D Barnes–Hut quadtree.
///
/// This structure owns:
/// - every node (`nodes`), the root is always index 0
/// - a copy of every inserted body (`bodies`), in insertion order
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    pub bodies: Vec<PointMass>,
    pub capacity: usize,
    pub theta: f64,
}

impl QuadTree {
    /// Empty tree covering `bounds`.
    ///
    /// `capacity` is the number of bodies a leaf may hold before it splits,
    /// `theta` the opening threshold used by [`QuadTree::calculate_force`].
    pub fn new(bounds: Bounds, capacity: usize, theta: f64) -> Self {
        Self {
            nodes: vec![QuadNode::empty(bounds, 0)],
            bodies: Vec::new(),
            capacity: capacity.max(1),
            theta,
        }
    }

    /// Build a Barnes–Hut tree (capacity 1) around `bodies`.
    ///
    /// The root covers the bodies' bounding box grown by `padding`.
    /// Body `i` of the input keeps index `i` inside the tree, which is what
    /// the self-skip of [`QuadTree::calculate_force`] refers to.
    ///
    /// Returns `None` when `bodies` is empty.
    pub fn build(bodies: &[PointMass], theta: f64, padding: f64) -> Option<Self> {
        let bounds = Bounds::enclosing(bodies.iter().map(|b| &b.x), padding)?;
        let mut tree = Self::new(bounds, 1, theta);
        for b in bodies {
            if !tree.insert(*b) {
                log::warn!("body at ({:.1}, {:.1}) fell outside the tree root", b.x.x, b.x.y);
            }
        }
        Some(tree)
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[0]
    }

    pub fn total_mass(&self) -> f64 {
        self.root().mass
    }

    pub fn center_of_mass(&self) -> NVec2 {
        self.root().com
    }

    /// Insert a body.
    ///
    /// Returns `false` (and stores nothing) when the body lies outside the
    /// root bounds. On success the body gets the next index in `bodies`.
    pub fn insert(&mut self, body: PointMass) -> bool {
        if !self.nodes[0].bounds.contains(&body.x) {
            return false;
        }
        let idx = self.bodies.len();
        self.bodies.push(body);
        self.place(0, idx);
        true
    }

    /// Accumulate the pull of every body in the tree on `target` into `acc`.
    ///
    /// - Leaves sum exact pairwise pulls, skipping the body indexed `skip`.
    /// - Internal nodes with `size / distance < theta` act as one pseudo-body
    ///   (radius 0) at their center of mass.
    /// - Everything else recurses into the four children.
    ///
    /// `skip` is the target's own index when the target was inserted, `None`
    /// for probes such as comets or the ship.
    pub fn calculate_force(&self, target: &PointMass, skip: Option<usize>, law: &ForceLaw, acc: &mut NVec2) {
        self.traverse_node(0, target, skip, law, acc);
    }

    // helpers ==============================================================================

    /// Push body `body_idx` into the subtree at `node_idx`.
    ///
    /// The caller has already checked that the body belongs here, so this
    /// never fails:
    /// - a leaf with room (or at max depth) stores the body,
    /// - a full leaf subdivides and pushes its bodies down first,
    /// - an internal node forwards to the first child that contains the body.
    ///
    /// Every node on the way gets its mass and center of mass updated.
    fn place(&mut self, node_idx: usize, body_idx: usize) {
        let depth = self.nodes[node_idx].depth;

        if self.nodes[node_idx].is_leaf() {
            let has_room = self.nodes[node_idx].bodies.len() < self.capacity;
            if has_room || depth >= MAX_DEPTH {
                self.nodes[node_idx].bodies.push(body_idx);
                self.accumulate(node_idx, body_idx);
                return;
            }

            // Full leaf: split and move what it held into the children.
            // The parent's aggregate already counts them.
            self.subdivide(node_idx);
            let existing = std::mem::take(&mut self.nodes[node_idx].bodies);
            for b in existing {
                let child = self.child_for(node_idx, b);
                self.place(child, b);
            }
        }

        let child = self.child_for(node_idx, body_idx);
        self.place(child, body_idx);
        self.accumulate(node_idx, body_idx);
    }

    /// Fold one body into a node's running mass and center of mass:
    /// `com' = (com * M + x * m) / (M + m)`.
    fn accumulate(&mut self, node_idx: usize, body_idx: usize) {
        let b = self.bodies[body_idx];
        let node = &mut self.nodes[node_idx];
        let total = node.mass + b.m;

        if node.mass == 0.0 {
            node.com = b.x;
        } else if total > 0.0 {
            node.com = (node.com * node.mass + b.x * b.m) / total;
        }
        node.mass = total;
    }

    /// Split a leaf into four equal children.
    fn subdivide(&mut self, node_idx: usize) {
        let bounds = self.nodes[node_idx].bounds;
        let depth = self.nodes[node_idx].depth + 1;
        let first = self.nodes.len();

        for q in [NW, NE, SW, SE] {
            self.nodes.push(QuadNode::empty(bounds.quadrant(q), depth));
        }
        self.nodes[node_idx].children = Some([first, first + 1, first + 2, first + 3]);
    }

    /// First child (NW, NE, SW, SE order) whose bounds contain the body.
    fn child_for(&self, node_idx: usize, body_idx: usize) -> usize {
        let node = &self.nodes[node_idx];
        let p = self.bodies[body_idx].x;
        // internal nodes always have children here
        let children = node.children.unwrap_or_default();

        children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].bounds.contains(&p))
            .unwrap_or_else(|| children[node.bounds.quadrant_of(&p)])
    }

    /// Recursive half of [`QuadTree::calculate_force`].
    fn traverse_node(&self, node_idx: usize, target: &PointMass, skip: Option<usize>, law: &ForceLaw, acc: &mut NVec2) {
        let node = &self.nodes[node_idx];

        let Some(children) = node.children else {
            // leaf, exact interaction with each stored body
            for &b in &node.bodies {
                if Some(b) == skip {
                    continue; // don't self-interact
                }
                *acc += law.pull(target, &self.bodies[b]);
            }
            return;
        };

        if node.mass > 0.0 {
            let dist = (node.com - target.x).norm();

            // dist == 0 would give s/d = inf, fall through and descend
            if dist > 0.0 && node.bounds.size() / dist < self.theta {
                // Far enough away: approximate this node as a single mass at COM
                let pseudo = PointMass {
                    x: node.com,
                    m: node.mass,
                    radius: 0.0,
                };
                *acc += law.pull(target, &pseudo);
                return;
            }
        }

        for child in children {
            self.traverse_node(child, target, skip, law, acc);
        }
    }
}
