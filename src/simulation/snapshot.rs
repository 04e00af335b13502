//! Save/load boundary.
//!
//! A [`WorldSnapshot`] is the serializable picture of a world: every body's
//! role, position, velocity, mass and radius, the ship's health, the clock
//! and the UI's selection indices. Cached accelerations are not saved;
//! a restored world starts with every `prev_accel` empty so velocity-Verlet
//! cold-starts from fresh forces.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::simulation::states::{Body, BodyRole, NVec2, Ship, SimulationWorld};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BodyRecord {
    pub role: BodyRole,
    pub x: [f64; 2],
    pub v: [f64; 2],
    pub m: f64,
    pub radius: f64,
}

impl From<&Body> for BodyRecord {
    fn from(b: &Body) -> Self {
        Self {
            role: b.role,
            x: [b.x.x, b.x.y],
            v: [b.v.x, b.v.y],
            m: b.m,
            radius: b.radius,
        }
    }
}

impl From<&BodyRecord> for Body {
    fn from(r: &BodyRecord) -> Self {
        Body::with_mass(r.role, NVec2::new(r.x[0], r.x[1]), NVec2::new(r.v[0], r.v[1]), r.m, r.radius)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShipRecord {
    pub body: BodyRecord,
    pub health: f64,
}

/// Tracking and selection indices owned by the UI, carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tracked_planet: Option<usize>,
    pub tracked_comet: Option<usize>,
    pub selected_planet: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub t: f64,
    pub stars: Vec<BodyRecord>,
    pub planets: Vec<BodyRecord>,
    #[serde(default)]
    pub comets: Vec<BodyRecord>,
    #[serde(default)]
    pub ship: Option<ShipRecord>,
    #[serde(default)]
    pub selection: Selection,
}

impl WorldSnapshot {
    pub fn capture(world: &SimulationWorld, selection: Selection) -> Self {
        Self {
            t: world.t,
            stars: world.stars.iter().map(BodyRecord::from).collect(),
            planets: world.planets.iter().map(BodyRecord::from).collect(),
            comets: world.comets.iter().map(BodyRecord::from).collect(),
            ship: world.ship.as_ref().map(|s| ShipRecord {
                body: BodyRecord::from(&s.body),
                health: s.health,
            }),
            selection,
        }
    }

    /// Rebuild the world. Every `prev_accel` comes back as `None`.
    pub fn restore(&self) -> SimulationWorld {
        SimulationWorld {
            stars: self.stars.iter().map(Body::from).collect(),
            planets: self.planets.iter().map(Body::from).collect(),
            comets: self.comets.iter().map(Body::from).collect(),
            ship: self.ship.as_ref().map(|s| Ship {
                body: Body::from(&s.body),
                health: s.health,
            }),
            t: self.t,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }
}
