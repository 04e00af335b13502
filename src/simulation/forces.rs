//! Force / acceleration contributors for the n-body engine
//!
//! `ForceLaw` is the softened pairwise pull shared by every path.
//! `Acceleration` is implemented by direct Newtonian gravity and by the
//! Barnes–Hut quadtree variant; `ForceSolver` sums the active terms.
//!
//! All "forces" here are per unit mass of the body being pulled, the
//! integrators apply them directly as accelerations.

use crate::simulation::barnes_hut::{PointMass, QuadTree};
use crate::simulation::params::Parameters;
use crate::simulation::states::NVec2;

/// Softened inverse-square pull with a contact floor.
///
/// `a = G * m_other / (d² + eps)` along the unit vector toward the other
/// body, and nothing at all when `d < r_a + r_b + contact_buffer`.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceLaw {
    pub G: f64, // gravitational constant
    pub eps: f64, // softening added to d^2
    pub contact_buffer: f64, // extra floor distance beyond touching
}

impl ForceLaw {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            G: p.G,
            eps: p.eps,
            contact_buffer: p.contact_buffer,
        }
    }

    /// Pull of `source` on `target`.
    pub fn pull(&self, target: &PointMass, source: &PointMass) -> NVec2 {
        let r = source.x - target.x;
        let dist_sq = r.dot(&r) + self.eps;
        let dist = dist_sq.sqrt();

        // inside the contact floor: no force rather than an explosive one
        if dist < target.radius + source.radius + self.contact_buffer {
            return NVec2::zeros();
        }

        r * (self.G * source.m / (dist_sq * dist))
    }
}

/// Trait for 2D acceleration sources.
/// Implementations add their contribution into `out[i]`.
pub trait Acceleration {
    /// Mutual accelerations: every body pulls on every other.
    fn acceleration(&self, bodies: &[PointMass], out: &mut [NVec2]);

    /// One-way field of `sources` at each probe. Probes feel the sources but
    /// do not pull back.
    fn field(&self, sources: &[PointMass], probes: &[PointMass], out: &mut [NVec2]);
}

/// Direct O(n²) Newtonian gravity
pub struct NewtonianGravity {
    pub law: ForceLaw,
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, bodies: &[PointMass], out: &mut [NVec2]) {
        let n = bodies.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            for j in (i + 1)..n {
                out[i] += self.law.pull(&bodies[i], &bodies[j]);
                out[j] += self.law.pull(&bodies[j], &bodies[i]);
            }
        }
    }

    fn field(&self, sources: &[PointMass], probes: &[PointMass], out: &mut [NVec2]) {
        for (p, a) in probes.iter().zip(out.iter_mut()) {
            for s in sources {
                *a += self.law.pull(p, s);
            }
        }
    }
}

/// Newtonian gravity evaluated through a Barnes–Hut quadtree.
/// One tree is built per call and shared by every body (or probe) evaluated.
pub struct NewtonianGravityBarnesHut {
    pub law: ForceLaw,
    pub theta: f64, // opening threshold
    pub padding: f64, // root bounds padding
}

impl Acceleration for NewtonianGravityBarnesHut {
    fn acceleration(&self, bodies: &[PointMass], out: &mut [NVec2]) {
        let Some(tree) = QuadTree::build(bodies, self.theta, self.padding) else {
            return;
        };
        for (i, b) in bodies.iter().enumerate() {
            tree.calculate_force(b, Some(i), &self.law, &mut out[i]);
        }
    }

    fn field(&self, sources: &[PointMass], probes: &[PointMass], out: &mut [NVec2]) {
        let Some(tree) = QuadTree::build(sources, self.theta, self.padding) else {
            return;
        };
        for (p, a) in probes.iter().zip(out.iter_mut()) {
            tree.calculate_force(p, None, &self.law, a);
        }
    }
}

/// Collection of acceleration terms.
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single vector per body.
pub struct ForceSolver {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for ForceSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSolver {
    /// Create an empty solver (every body feels zero force)
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Gravity as configured: Barnes–Hut or direct summation.
    pub fn from_params(p: &Parameters) -> Self {
        let law = ForceLaw::from_params(p);
        if p.barnes_hut {
            Self::new().with(NewtonianGravityBarnesHut {
                law,
                theta: p.theta,
                padding: p.padding,
            })
        } else {
            Self::new().with(NewtonianGravity { law })
        }
    }

    /// Net acceleration on each body from all the others, in input order.
    ///
    /// Empty input gives an empty result, a single body gets a zero vector.
    /// The input is never mutated.
    pub fn compute_forces(&self, bodies: &[PointMass]) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); bodies.len()];
        if bodies.is_empty() {
            return out;
        }
        for term in &self.terms {
            term.acceleration(bodies, &mut out);
        }
        out
    }

    /// One-way field of `sources` at every probe, in probe order.
    pub fn field_at_many(&self, sources: &[PointMass], probes: &[PointMass]) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); probes.len()];
        if sources.is_empty() || probes.is_empty() {
            return out;
        }
        for term in &self.terms {
            term.field(sources, probes, &mut out);
        }
        out
    }

    /// One-way field of `sources` at a single probe.
    pub fn field_at(&self, sources: &[PointMass], probe: &PointMass) -> NVec2 {
        self.field_at_many(sources, std::slice::from_ref(probe))
            .pop()
            .unwrap_or_else(NVec2::zeros)
    }
}
