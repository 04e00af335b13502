//! Forward orbit prediction
//!
//! `OrbitPredictor` runs a private copy of the world ahead in time with its
//! own solver and integrator and hands back sampled paths. The live world is
//! only read. Predicted paths for all planets can be scanned for upcoming
//! collisions.
//!
//! Prediction is expensive, so the controller refreshes it through a
//! [`PredictionThrottle`] instead of every tick.

use std::time::Duration;

use instant::Instant;
use log::debug;

use crate::simulation::forces::ForceSolver;
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodyRef, NVec2, SimulationWorld};

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    pub steps: usize, // forecast length in steps
    pub time_step: f64, // length of one forecast step
    pub sub_steps: usize, // integrator sub-steps per forecast step
    pub sample_every: usize, // record one point every n steps
    pub collision_buffer: f64, // added to r_a + r_b when scanning paths
    pub comet_steps: usize, // comets get a shorter, coarser forecast
    pub comet_time_step: f64,
    pub comet_escape_distance: f64, // comet forecasts stop past this from every star
    pub interval: Duration, // minimum time between refreshes
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            steps: 1000,
            time_step: 10.0,
            sub_steps: 4,
            sample_every: 2,
            collision_buffer: 10.0,
            comet_steps: 500,
            comet_time_step: 15.0,
            comet_escape_distance: 100_000.0,
            interval: Duration::from_millis(100),
        }
    }
}

/// One recorded point of a predicted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub x: NVec2, // position
    pub step: usize, // forecast steps completed when recorded
}

/// A forecast overlap between two planets.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedCollision {
    pub pair: (usize, usize), // planet indices, lower first
    pub step: usize, // forecast step of the first overlap
    pub position: NVec2, // midpoint of the two bodies
    pub distance: f64,
    pub time: f64, // simulated time until the overlap
}

/// Which forecasts to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForecastRequest {
    pub planet_paths: bool,
    pub collisions: bool,
    pub ship_path: bool,
}

impl ForecastRequest {
    pub fn is_empty(&self) -> bool {
        !(self.planet_paths || self.collisions || self.ship_path)
    }
}

/// Everything the display layer asked to be predicted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub planet_paths: Vec<Vec<PathPoint>>,
    pub collisions: Vec<PredictedCollision>,
    pub ship_path: Vec<PathPoint>,
}

pub struct OrbitPredictor {
    pub config: PredictionConfig,
    solver: ForceSolver,
    integrator: Integrator,
}

impl OrbitPredictor {
    /// Predictor using the same gravity as the live simulation but a fixed
    /// step, with the ship integrated by verlet like everything else.
    pub fn new(params: &Parameters, config: PredictionConfig) -> Self {
        let mut integrator = Integrator::from_params(params);
        integrator.adaptive = false;
        integrator.ship_verlet = true;
        integrator.sub_steps = config.sub_steps;

        Self {
            config,
            solver: ForceSolver::from_params(params),
            integrator,
        }
    }

    /// Sampled future path of one body over the configured horizon.
    ///
    /// Returns an empty path when `target` does not name a body.
    pub fn predict_path(&self, world: &SimulationWorld, target: BodyRef) -> Vec<PathPoint> {
        self.predict_path_with(world, target, self.config.steps, self.config.time_step)
    }

    /// Like [`predict_path`](Self::predict_path) for `steps` steps of
    /// `time_step` each.
    ///
    /// Comets keep their own coarser step and run at most `comet_steps`.
    pub fn predict_path_with(&self, world: &SimulationWorld, target: BodyRef, steps: usize, time_step: f64) -> Vec<PathPoint> {
        if world.body(target).is_none() {
            return Vec::new();
        }

        let (steps, time_step) = match target {
            BodyRef::Comet(_) => (steps.min(self.config.comet_steps), self.config.comet_time_step),
            _ => (steps, time_step),
        };

        let mut scratch = world.clone();
        let mut path = Vec::with_capacity(steps / self.config.sample_every.max(1) + 1);

        for k in 0..steps {
            self.integrator.advance(&mut scratch, &self.solver, time_step);

            let Some(body) = scratch.body(target) else {
                break;
            };
            if k % self.config.sample_every.max(1) == 0 {
                path.push(PathPoint { x: body.x, step: k + 1 });
            }

            if matches!(target, BodyRef::Comet(_))
                && scratch.distance_to_nearest_star(&body.x) > self.config.comet_escape_distance
            {
                break; // left the system
            }
        }
        path
    }

    /// Sampled future paths of every planet over the configured horizon.
    pub fn predict_all(&self, world: &SimulationWorld) -> Vec<Vec<PathPoint>> {
        self.predict_all_with(world, self.config.steps, self.config.time_step)
    }

    /// Every planet path for `steps` steps of `time_step`, run together in one
    /// scratch world.
    pub fn predict_all_with(&self, world: &SimulationWorld, steps: usize, time_step: f64) -> Vec<Vec<PathPoint>> {
        if world.planets.is_empty() {
            return Vec::new();
        }

        // comets only matter here when they pull on planets
        let mut scratch = SimulationWorld {
            stars: world.stars.clone(),
            planets: world.planets.clone(),
            comets: if self.integrator.comets_exert_gravity {
                world.comets.clone()
            } else {
                Vec::new()
            },
            ship: None,
            t: world.t,
        };

        let every = self.config.sample_every.max(1);
        let mut paths = vec![Vec::with_capacity(steps / every + 1); world.planets.len()];

        for k in 0..steps {
            self.integrator.advance(&mut scratch, &self.solver, time_step);
            if k % every == 0 {
                for (path, p) in paths.iter_mut().zip(scratch.planets.iter()) {
                    path.push(PathPoint { x: p.x, step: k + 1 });
                }
            }
        }
        paths
    }

    /// Scan parallel planet paths for their first overlaps.
    ///
    /// A pair overlaps when `distance <= r_a + r_b + collision_buffer`.
    /// Once a planet is part of a reported collision its later pairs are
    /// ignored, so each planet appears at most once.
    pub fn detect_collisions(&self, paths: &[Vec<PathPoint>], radii: &[f64]) -> Vec<PredictedCollision> {
        let mut collisions = Vec::new();
        if paths.len() < 2 {
            return collisions;
        }

        let n = paths.len().min(radii.len());
        let samples = paths.iter().map(Vec::len).min().unwrap_or(0);
        let mut implicated = vec![false; n];

        for s in 0..samples {
            for i in 0..n {
                if implicated[i] {
                    continue;
                }
                for j in (i + 1)..n {
                    if implicated[j] {
                        continue;
                    }
                    let a = &paths[i][s];
                    let b = &paths[j][s];
                    let distance = (a.x - b.x).norm();

                    if distance <= radii[i] + radii[j] + self.config.collision_buffer {
                        collisions.push(PredictedCollision {
                            pair: (i, j),
                            step: a.step,
                            position: (a.x + b.x) * 0.5,
                            distance,
                            time: a.step as f64 * self.config.time_step,
                        });
                        implicated[i] = true;
                        implicated[j] = true;
                        break;
                    }
                }
            }
        }
        collisions
    }

    /// Whatever `request` asks for. Collision scanning implies planet paths.
    pub fn forecast(&self, world: &SimulationWorld, request: ForecastRequest) -> Forecast {
        let planet_paths = if request.planet_paths || request.collisions {
            self.predict_all(world)
        } else {
            Vec::new()
        };

        let collisions = if request.collisions {
            let radii: Vec<f64> = world.planets.iter().map(|p| p.radius).collect();
            self.detect_collisions(&planet_paths, &radii)
        } else {
            Vec::new()
        };

        let ship_path = if request.ship_path {
            self.predict_path(world, BodyRef::Ship)
        } else {
            Vec::new()
        };

        debug!(
            "forecast refreshed: {} planet paths, {} predicted collisions",
            planet_paths.len(),
            collisions.len()
        );

        Forecast {
            planet_paths,
            collisions,
            ship_path,
        }
    }
}

/// Rate limit for expensive recomputation.
#[derive(Debug, Clone)]
pub struct PredictionThrottle {
    pub interval: Duration,
    last: Option<Instant>,
}

impl PredictionThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// True when nothing ran yet or `interval` has passed since the last run.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// `ready` followed by `mark` when it was.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.ready(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }

    /// Force the next `ready` to succeed.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
