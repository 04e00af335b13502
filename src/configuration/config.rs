//! Configuration types for loading sandbox scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – solver and integrator switches, warp ladder
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`PredictionSettings`] – orbit forecast length and refresh rate
//! - [`SpawnerSettings`]  – periodic comet spawning
//! - [`BodyConfig`]       – initial state for each star, planet or comet
//! - [`MoonConfig`]       – moons placed on a barycentric orbit around a planet
//! - [`ShipConfig`]       – the player ship
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every section except `bodies` may be left out and falls back to the game's
//! constants.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   barnes_hut: true
//!   theta: 0.5
//!   merge_position: "mass_weighted"   # or "midpoint"
//!   warp_ladder: [1, 2, 5, 10, 25]
//!
//! parameters:
//!   G: 20.0
//!   eps: 1.0e-6
//!   time_step: 1.0
//!   seed: 42
//!
//! bodies:
//!   - role: star
//!     x: [0.0, 0.0]
//!     radius: 500.0
//!   - role: planet
//!     x: [3000.0, 0.0]
//!     radius: 40.0
//!     orbit: 0              # circular orbit around body 0
//!
//! moons:
//!   - planet: 1
//!     radius: 8.0
//!     distance: 200.0
//!     angle: 0.0
//!
//! ship:
//!   x: [0.0, 700.0]
//! ```

use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::simulation::states::BodyRole;

/// How merged planets are positioned
/// `merge_position: "mass_weighted"` or `merge_position: "midpoint"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePositionConfig {
    #[default]
    #[serde(rename = "mass_weighted")] // barycenter of the pair, keeps the center of mass fixed
    MassWeighted,

    #[serde(rename = "midpoint")] // arithmetic mean of the two centers
    Midpoint,
}

/// Solver and integrator switches
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub barnes_hut: bool, // `true` - quadtree approximation, `false` - direct N^2 summation
    pub theta: f64, // opening threshold, smaller is more accurate
    pub sub_steps: usize, // integration sub-steps per logical tick
    pub adaptive: bool, // shrink the tick on close planet approaches
    pub comets_exert_gravity: bool, // comets pull on stars and planets too
    pub merge_position: MergePositionConfig,
    pub warp_ladder: Vec<u32>, // selectable warp factors
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            barnes_hut: true,
            theta: 0.5,
            sub_steps: 4,
            adaptive: true,
            comets_exert_gravity: false,
            merge_position: MergePositionConfig::MassWeighted,
            warp_ladder: vec![1, 2, 5, 10, 25],
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParametersConfig {
    pub G: f64, // gravitational constant
    pub eps: f64, // softening added to distance squared
    pub contact_buffer: f64, // no force closer than r_a + r_b + buffer
    pub padding: f64, // quadtree root padding
    pub time_step: f64, // logical tick length at 1x
    pub close_approach_ratio: f64,
    pub min_step_factor: f64,
    pub world_size: f64, // comet escape distance is 1.2x this
    pub seed: u64, // deterministic seed to make runs reproducible
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            G: 20.0,
            eps: 1e-6,
            contact_buffer: 5.0,
            padding: 1000.0,
            time_step: 1.0,
            close_approach_ratio: 10.0,
            min_step_factor: 0.1,
            world_size: 50_000.0,
            seed: 42,
        }
    }
}

/// Orbit forecast settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PredictionSettings {
    pub steps: usize,
    pub time_step: f64,
    pub sample_every: usize,
    pub collision_buffer: f64,
    pub interval_ms: u64, // minimum time between refreshes
    pub show_trails: bool,
    pub show_collision_prediction: bool,
    pub show_ship_trajectory: bool,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            steps: 1000,
            time_step: 10.0,
            sample_every: 2,
            collision_buffer: 10.0,
            interval_ms: 100,
            show_trails: false,
            show_collision_prediction: false,
            show_ship_trajectory: false,
        }
    }
}

/// Periodic comet spawning
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnerSettings {
    pub enabled: bool,
    pub interval_frames: u64,
    pub max_comets: usize,
    pub min_distance: f64,
    pub max_distance: f64,
    pub secondary_min_distance: f64, // band around stars after the first
    pub secondary_max_distance: f64,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_frames: 60,
            max_comets: 30,
            min_distance: 20_000.0,
            max_distance: 40_000.0,
            secondary_min_distance: 5_000.0,
            secondary_max_distance: 15_000.0,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub role: BodyRole, // star, planet or comet
    pub x: [f64; 2], // initial position
    #[serde(default)]
    pub v: Option<[f64; 2]>, // initial velocity, ignored when `orbit` is set
    pub radius: f64, // collision radius, also sets the mass unless `m` is given
    #[serde(default)]
    pub m: Option<f64>, // explicit mass override
    #[serde(default)]
    pub orbit: Option<usize>, // index of a star body to orbit
}

/// A moon on a barycentric orbit around a planet
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MoonConfig {
    pub planet: usize, // index into `bodies`
    pub radius: f64,
    pub distance: f64, // from the planet center
    #[serde(default)]
    pub angle: f64, // radians
    #[serde(default)]
    pub star: Option<usize>, // star the pair orbits, defaults to the first star
}

/// Player ship
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ShipConfig {
    pub x: [f64; 2],
    #[serde(default)]
    pub v: Option<[f64; 2]>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub prediction: PredictionSettings,
    #[serde(default)]
    pub spawner: SpawnerSettings,
    pub bodies: Vec<BodyConfig>, // initial stars, planets and comets
    #[serde(default)]
    pub moons: Vec<MoonConfig>,
    #[serde(default)]
    pub ship: Option<ShipConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reject values the simulation cannot start from.
    pub fn validate(&self) -> Result<()> {
        let e = &self.engine;
        let p = &self.parameters;

        if !(e.theta.is_finite() && e.theta > 0.0) {
            return Err(SimError::InvalidConfig(format!("theta must be positive, got {}", e.theta)));
        }
        if e.sub_steps == 0 {
            return Err(SimError::InvalidConfig("sub_steps must be at least 1".into()));
        }
        if e.warp_ladder.is_empty() {
            return Err(SimError::InvalidConfig("warp_ladder is empty".into()));
        }
        if e.warp_ladder.contains(&0) {
            return Err(SimError::InvalidConfig("warp_ladder rungs must be at least 1, use pause instead".into()));
        }
        if !(p.time_step.is_finite() && p.time_step > 0.0) {
            return Err(SimError::InvalidConfig(format!("time_step must be positive, got {}", p.time_step)));
        }
        if !(p.G.is_finite() && p.eps.is_finite() && p.eps >= 0.0) {
            return Err(SimError::InvalidConfig("G and eps must be finite, eps non-negative".into()));
        }
        if self.prediction.sample_every == 0 {
            return Err(SimError::InvalidConfig("prediction.sample_every must be at least 1".into()));
        }

        for (i, b) in self.bodies.iter().enumerate() {
            let bad = |reason: &str| SimError::InvalidBody { index: i, reason: reason.to_string() };

            if b.role == BodyRole::Ship {
                return Err(bad("the ship goes in the `ship` section"));
            }
            let finite = b.x.iter().chain(b.v.iter().flatten()).all(|c| c.is_finite());
            if !finite || !b.radius.is_finite() {
                return Err(bad("non-finite position, velocity or radius"));
            }
            if b.radius < 0.0 {
                return Err(bad("negative radius"));
            }
            let m = b.m.unwrap_or_else(|| b.role.mass_for_radius(b.radius));
            if !(m.is_finite() && m > 0.0) {
                return Err(bad("mass must be positive"));
            }
            if let Some(s) = b.orbit {
                match self.bodies.get(s) {
                    Some(star) if star.role == BodyRole::Star && s != i => {}
                    _ => return Err(bad("orbit must name another star body")),
                }
            }
        }

        for (k, moon) in self.moons.iter().enumerate() {
            let planet_ok = self.bodies.get(moon.planet).is_some_and(|b| b.role == BodyRole::Planet);
            if !planet_ok {
                return Err(SimError::InvalidConfig(format!("moon {k} names a body that is not a planet")));
            }
            let star_ok = match moon.star {
                Some(s) => self.bodies.get(s).is_some_and(|b| b.role == BodyRole::Star),
                None => self.bodies.iter().any(|b| b.role == BodyRole::Star),
            };
            if !star_ok {
                return Err(SimError::InvalidConfig(format!("moon {k} has no star to orbit")));
            }
            if !(moon.radius > 0.0 && moon.distance > 0.0) {
                return Err(SimError::InvalidConfig(format!("moon {k} needs positive radius and distance")));
            }
        }

        Ok(())
    }
}
