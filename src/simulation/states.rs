//! Core state types for the sandbox simulation.
//!
//! Defines the 2D body and world structs:
//! - `BodyRole` tags what a body is (star, planet/moon, comet, ship)
//! - `Body` carries the shared kinematics every role integrates with
//! - `Ship` wraps the player's body together with its hull health
//! - `SimulationWorld` owns every live collection plus the simulation time `t`
//!
//! `BodyRef` addresses a single body inside a world without borrowing it.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::simulation::barnes_hut::PointMass;

pub type NVec2 = Vector2<f64>;

pub const PLANET_MASS_PER_RADIUS: f64 = 0.5;
pub const STAR_MASS_PER_RADIUS: f64 = 2.0;
pub const NOMINAL_MASS: f64 = 1.0; // comets and the ship
pub const SHIP_RADIUS: f64 = 16.0; // half the hull width
pub const SHIP_HEALTH: f64 = 100.0;

/// What kind of body this is. Every role shares the same kinematic fields,
/// the role only decides mass derivation and which rules apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyRole {
    Star,
    Planet, // planets and moons
    Comet,
    Ship,
}

impl BodyRole {
    /// Mass implied by a radius for this role.
    pub fn mass_for_radius(self, radius: f64) -> f64 {
        match self {
            BodyRole::Star => radius * STAR_MASS_PER_RADIUS,
            BodyRole::Planet => radius * PLANET_MASS_PER_RADIUS,
            BodyRole::Comet | BodyRole::Ship => NOMINAL_MASS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub role: BodyRole,
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub radius: f64, // collision radius
    pub prev_accel: Option<NVec2>, // acceleration from the last verlet kick
}

impl Body {
    /// Body whose mass is derived from `radius` by its role.
    pub fn new(role: BodyRole, x: NVec2, v: NVec2, radius: f64) -> Self {
        Self {
            role,
            x,
            v,
            m: role.mass_for_radius(radius),
            radius,
            prev_accel: None,
        }
    }

    /// Body with an explicit mass (merged bodies, loaded snapshots).
    pub fn with_mass(role: BodyRole, x: NVec2, v: NVec2, m: f64, radius: f64) -> Self {
        Self { role, x, v, m, radius, prev_accel: None }
    }

    pub fn star(x: NVec2, v: NVec2, radius: f64) -> Self {
        Self::new(BodyRole::Star, x, v, radius)
    }

    pub fn planet(x: NVec2, v: NVec2, radius: f64) -> Self {
        Self::new(BodyRole::Planet, x, v, radius)
    }

    pub fn comet(x: NVec2, v: NVec2, radius: f64) -> Self {
        Self::new(BodyRole::Comet, x, v, radius)
    }

    pub fn ship(x: NVec2, v: NVec2) -> Self {
        Self::new(BodyRole::Ship, x, v, SHIP_RADIUS)
    }

    /// Gravitational view of this body used by the force solver.
    pub fn point_mass(&self) -> PointMass {
        PointMass {
            x: self.x,
            m: self.m,
            radius: self.radius,
        }
    }

    pub fn momentum(&self) -> NVec2 {
        self.v * self.m
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (other.x - self.x).norm()
    }
}

/// Player ship: a body plus hull health.
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub body: Body,
    pub health: f64,
}

impl Ship {
    pub fn new(x: NVec2, v: NVec2) -> Self {
        Self {
            body: Body::ship(x, v),
            health: SHIP_HEALTH,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    /// Engine thrust available at the current health, `base` when undamaged.
    pub fn thrust(&self, base: f64) -> f64 {
        if self.health <= 0.0 {
            0.0
        } else if self.health <= 50.0 {
            base.min(0.05)
        } else if self.health <= 70.0 {
            base.min(0.1)
        } else {
            base
        }
    }
}

/// Addresses one body inside a [`SimulationWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Star(usize),
    Planet(usize),
    Comet(usize),
    Ship,
}

/// Every live body collection plus the simulation clock.
///
/// Owned by a single controller and handed by reference to the solver,
/// integrator, collision resolver and predictor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationWorld {
    pub stars: Vec<Body>,
    pub planets: Vec<Body>, // planets and moons
    pub comets: Vec<Body>,
    pub ship: Option<Ship>,
    pub t: f64, // time
}

impl SimulationWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, r: BodyRef) -> Option<&Body> {
        match r {
            BodyRef::Star(i) => self.stars.get(i),
            BodyRef::Planet(i) => self.planets.get(i),
            BodyRef::Comet(i) => self.comets.get(i),
            BodyRef::Ship => self.ship.as_ref().map(|s| &s.body),
        }
    }

    pub fn body_count(&self) -> usize {
        self.stars.len() + self.planets.len() + self.comets.len() + usize::from(self.ship.is_some())
    }

    /// Stars then planets, the bodies that pull on everything else.
    pub fn massive_point_masses(&self) -> Vec<PointMass> {
        self.stars
            .iter()
            .chain(self.planets.iter())
            .map(Body::point_mass)
            .collect()
    }

    /// Sum of `m * v` over stars, planets and comets.
    pub fn total_momentum(&self) -> NVec2 {
        self.stars
            .iter()
            .chain(self.planets.iter())
            .chain(self.comets.iter())
            .fold(NVec2::zeros(), |acc, b| acc + b.momentum())
    }

    /// Distance from `p` to the closest star, or to the origin when there are none.
    pub fn distance_to_nearest_star(&self, p: &NVec2) -> f64 {
        if self.stars.is_empty() {
            return p.norm();
        }
        self.stars
            .iter()
            .map(|s| (s.x - p).norm())
            .fold(f64::INFINITY, f64::min)
    }

    /// Forget every cached acceleration so verlet cold-starts on the next step.
    pub fn clear_accelerations(&mut self) {
        for b in self
            .stars
            .iter_mut()
            .chain(self.planets.iter_mut())
            .chain(self.comets.iter_mut())
        {
            b.prev_accel = None;
        }
        if let Some(ship) = self.ship.as_mut() {
            ship.body.prev_accel = None;
        }
    }
}
