//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - numerical parameters (`Parameters`)
//! - the initial world (`SimulationWorld` with bodies at t = 0)
//! - collision, prediction, timewarp and spawner settings
//!
//! `Scenario::into_engine` hands everything to an [`Engine`].

use std::time::Duration;

use crate::configuration::config::{BodyConfig, MergePositionConfig, ScenarioConfig};
use crate::error::Result;
use crate::simulation::collisions::{CollisionConfig, MergePosition};
use crate::simulation::engine::{DisplayToggles, Engine};
use crate::simulation::orbits::{create_moon_with_orbit, place_in_orbit};
use crate::simulation::params::Parameters;
use crate::simulation::prediction::PredictionConfig;
use crate::simulation::spawner::{CometSpawner, SpawnerConfig};
use crate::simulation::states::{Body, BodyRole, NVec2, Ship, SimulationWorld};
use crate::simulation::timewarp::TimewarpScheduler;

/// Comets farther than this multiple of the world size from every star are dropped.
const ESCAPE_FACTOR: f64 = 1.2;
/// Comet forecasts stop at this multiple of the world size.
const FORECAST_ESCAPE_FACTOR: f64 = 2.0;

/// Runtime bundle constructed from a [`ScenarioConfig`].
#[derive(Debug, Clone)]
pub struct Scenario {
    pub parameters: Parameters,
    pub world: SimulationWorld,
    pub collisions: CollisionConfig,
    pub prediction: PredictionConfig,
    pub warp_ladder: Vec<u32>,
    pub spawner: Option<SpawnerConfig>,
    pub display: DisplayToggles,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        cfg.validate()?;

        // Parameters (runtime) from engine + parameters sections
        let e_cfg = &cfg.engine;
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            G: p_cfg.G,
            eps: p_cfg.eps,
            contact_buffer: p_cfg.contact_buffer,
            barnes_hut: e_cfg.barnes_hut,
            theta: e_cfg.theta,
            padding: p_cfg.padding,
            time_step: p_cfg.time_step,
            sub_steps: e_cfg.sub_steps,
            adaptive: e_cfg.adaptive,
            close_approach_ratio: p_cfg.close_approach_ratio,
            min_step_factor: p_cfg.min_step_factor,
            comets_exert_gravity: e_cfg.comets_exert_gravity,
            seed: p_cfg.seed,
        };

        // Bodies: map `BodyConfig` -> runtime `Body` in config order, then wire up orbits
        let mut bodies: Vec<Body> = cfg.bodies.iter().map(body_from_config).collect();

        for (i, bc) in cfg.bodies.iter().enumerate() {
            if let Some(s) = bc.orbit {
                let (star, planet) = pair_mut(&mut bodies, s, i);
                place_in_orbit(parameters.G, star, planet);
            }
        }

        let mut moons = Vec::with_capacity(cfg.moons.len());
        for mc in &cfg.moons {
            let star_idx = mc
                .star
                .or_else(|| cfg.bodies.iter().position(|b| b.role == BodyRole::Star))
                .unwrap_or_default();
            let (star, planet) = pair_mut(&mut bodies, star_idx, mc.planet);
            moons.push(create_moon_with_orbit(parameters.G, star, planet, mc.radius, mc.distance, mc.angle));
        }

        let mut world = SimulationWorld::new();
        for b in bodies {
            match b.role {
                BodyRole::Star => world.stars.push(b),
                BodyRole::Comet => world.comets.push(b),
                _ => world.planets.push(b),
            }
        }
        world.planets.extend(moons);

        world.ship = cfg.ship.as_ref().map(|sc| {
            let v = sc.v.map(vec2).unwrap_or_else(NVec2::zeros);
            Ship::new(vec2(sc.x), v)
        });

        let collisions = CollisionConfig {
            merge_position: match e_cfg.merge_position {
                MergePositionConfig::MassWeighted => MergePosition::MassWeighted,
                MergePositionConfig::Midpoint => MergePosition::Midpoint,
            },
            escape_distance: p_cfg.world_size * ESCAPE_FACTOR,
            ..CollisionConfig::default()
        };

        let pr = &cfg.prediction;
        let prediction = PredictionConfig {
            steps: pr.steps,
            time_step: pr.time_step,
            sub_steps: e_cfg.sub_steps,
            sample_every: pr.sample_every,
            collision_buffer: pr.collision_buffer,
            comet_escape_distance: p_cfg.world_size * FORECAST_ESCAPE_FACTOR,
            interval: Duration::from_millis(pr.interval_ms),
            ..PredictionConfig::default()
        };

        let sp = &cfg.spawner;
        let spawner = sp.enabled.then(|| SpawnerConfig {
            interval_frames: sp.interval_frames,
            max_comets: sp.max_comets,
            min_distance: sp.min_distance,
            max_distance: sp.max_distance,
            secondary_min_distance: sp.secondary_min_distance,
            secondary_max_distance: sp.secondary_max_distance,
            ..SpawnerConfig::default()
        });

        let display = DisplayToggles {
            trails: pr.show_trails,
            collision_prediction: pr.show_collision_prediction,
            ship_trajectory: pr.show_ship_trajectory,
        };

        Ok(Self {
            parameters,
            world,
            collisions,
            prediction,
            warp_ladder: e_cfg.warp_ladder.clone(),
            spawner,
            display,
        })
    }

    /// Hand the scenario to a controller. Accelerations are seeded there.
    pub fn into_engine(self) -> Engine {
        let seed = self.parameters.seed;
        let mut engine = Engine::new(self.world, self.parameters)
            .with_collisions(self.collisions)
            .with_timewarp(TimewarpScheduler::new(self.warp_ladder))
            .with_prediction(self.prediction)
            .with_display(self.display);

        if let Some(cfg) = self.spawner {
            engine = engine.with_spawner(CometSpawner::new(cfg, seed));
        }
        engine
    }
}

fn vec2(a: [f64; 2]) -> NVec2 {
    NVec2::new(a[0], a[1])
}

fn body_from_config(bc: &BodyConfig) -> Body {
    let v = bc.v.map(vec2).unwrap_or_else(NVec2::zeros);
    match bc.m {
        Some(m) => Body::with_mass(bc.role, vec2(bc.x), v, m, bc.radius),
        None => Body::new(bc.role, vec2(bc.x), v, bc.radius),
    }
}

/// Mutable references to two distinct entries, `a` first.
/// Indices were checked by `ScenarioConfig::validate`.
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}
