//! Runtime controller for the sandbox simulation
//!
//! `Engine` owns the [`SimulationWorld`] and every component that acts on it.
//! It is the only thing that mutates kinematic state: each frame it asks the
//! timewarp scheduler how much physics to run, integrates, resolves
//! collisions, spawns comets and refreshes the orbit forecast when the
//! display wants one and the throttle allows it.

use instant::Instant;
use log::info;

use crate::simulation::collisions::{CollisionConfig, CollisionEvent, CollisionResolver};
use crate::simulation::forces::ForceSolver;
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::prediction::{Forecast, ForecastRequest, OrbitPredictor, PredictionConfig, PredictionThrottle};
use crate::simulation::snapshot::{Selection, WorldSnapshot};
use crate::simulation::spawner::CometSpawner;
use crate::simulation::states::{Body, NVec2, Ship, SimulationWorld};
use crate::simulation::timewarp::TimewarpScheduler;

/// Display switches that decide which forecasts are kept up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayToggles {
    pub trails: bool, // predicted planet orbits
    pub collision_prediction: bool, // predicted planet collisions
    pub ship_trajectory: bool, // predicted ship path
}

impl DisplayToggles {
    pub fn request(&self) -> ForecastRequest {
        ForecastRequest {
            planet_paths: self.trails,
            collisions: self.collision_prediction,
            ship_path: self.ship_trajectory,
        }
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub render: bool, // draw this frame
    pub steps: u32, // logical physics ticks run
    pub time_advanced: f64, // simulated time applied, after adaptive scaling
    pub events: Vec<CollisionEvent>,
    pub forecast_refreshed: bool,
}

pub struct Engine {
    pub parameters: Parameters,
    pub display: DisplayToggles,
    world: SimulationWorld,
    solver: ForceSolver,
    integrator: Integrator,
    resolver: CollisionResolver,
    timewarp: TimewarpScheduler,
    predictor: OrbitPredictor,
    throttle: PredictionThrottle,
    spawner: Option<CometSpawner>,
    forecast: Forecast,
    events: Vec<CollisionEvent>,
    frame: u64,
}

impl Engine {
    /// Controller with default collision, warp and prediction settings.
    ///
    /// Every body's cached acceleration is seeded from the forces at its
    /// starting position.
    pub fn new(world: SimulationWorld, parameters: Parameters) -> Self {
        let prediction = PredictionConfig::default();
        let mut engine = Self {
            solver: ForceSolver::from_params(&parameters),
            integrator: Integrator::from_params(&parameters),
            resolver: CollisionResolver::default(),
            timewarp: TimewarpScheduler::default(),
            predictor: OrbitPredictor::new(&parameters, prediction.clone()),
            throttle: PredictionThrottle::new(prediction.interval),
            spawner: None,
            forecast: Forecast::default(),
            events: Vec::new(),
            frame: 0,
            display: DisplayToggles::default(),
            parameters,
            world,
        };
        engine.seed();
        engine
    }

    pub fn with_collisions(mut self, config: CollisionConfig) -> Self {
        self.resolver = CollisionResolver::new(config);
        self
    }

    pub fn with_timewarp(mut self, timewarp: TimewarpScheduler) -> Self {
        self.timewarp = timewarp;
        self
    }

    pub fn with_prediction(mut self, config: PredictionConfig) -> Self {
        self.throttle = PredictionThrottle::new(config.interval);
        self.predictor = OrbitPredictor::new(&self.parameters, config);
        self
    }

    pub fn with_spawner(mut self, spawner: CometSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn with_display(mut self, display: DisplayToggles) -> Self {
        self.display = display;
        self
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn timewarp(&self) -> &TimewarpScheduler {
        &self.timewarp
    }

    pub fn predictor(&self) -> &OrbitPredictor {
        &self.predictor
    }

    /// Change the forecast length, taking effect on the next refresh.
    pub fn set_prediction_steps(&mut self, steps: usize) {
        self.predictor.config.steps = steps;
        self.throttle.invalidate();
    }

    pub fn forecast(&self) -> &Forecast {
        &self.forecast
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    // ==================================================================================
    // frame loop
    // ==================================================================================

    /// Run one rendered frame.
    ///
    /// `now` is the wall clock used by the forecast throttle.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        self.frame += 1;
        let plan = self.timewarp.plan_frame();
        let mut report = TickReport {
            render: plan.render,
            steps: plan.physics_steps,
            ..TickReport::default()
        };

        for _ in 0..plan.physics_steps {
            let (applied, events) = self.step(plan.sub_time_step * self.parameters.time_step);
            report.time_advanced += applied;
            report.events.extend(events);
        }

        if plan.physics_steps > 0 {
            let spawned = match self.spawner.as_mut() {
                Some(spawner) => spawner.maybe_spawn(&mut self.world, self.parameters.G, self.frame),
                None => false,
            };
            if spawned {
                self.seed();
            }
        }

        let request = self.display.request();
        if !request.is_empty() && self.throttle.try_acquire(now) {
            self.forecast = self.predictor.forecast(&self.world, request);
            report.forecast_refreshed = true;
        }

        report
    }

    /// One logical physics tick: integrate, then resolve collisions.
    ///
    /// Returns the time actually applied and the collisions it caused. The
    /// same events are also queued for [`drain_events`](Self::drain_events).
    pub fn step(&mut self, time_step: f64) -> (f64, Vec<CollisionEvent>) {
        let applied = self.integrator.advance(&mut self.world, &self.solver, time_step);
        let events = self.resolver.resolve(&mut self.world);

        if events.iter().any(|e| matches!(e, CollisionEvent::PlanetsMerged { .. })) {
            // planet indices changed, the cached forecast is stale
            self.throttle.invalidate();
        }
        self.events.extend(events.iter().cloned());
        (applied, events)
    }

    /// Take every collision event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fill every empty `prev_accel` from the current forces.
    fn seed(&mut self) {
        self.integrator.seed_accelerations(&mut self.world, &self.solver);
    }

    // ==================================================================================
    // body provider
    // ==================================================================================

    pub fn add_star(&mut self, star: Body) {
        self.world.stars.push(star);
        self.seed();
    }

    pub fn add_planet(&mut self, planet: Body) {
        self.world.planets.push(planet);
        self.seed();
    }

    pub fn add_comet(&mut self, comet: Body) {
        self.world.comets.push(comet);
        self.seed();
    }

    pub fn set_ship(&mut self, ship: Option<Ship>) {
        self.world.ship = ship;
    }

    /// Input-driven thrust on the ship, scaled by what its health allows.
    pub fn thrust_ship(&mut self, direction: NVec2, base_thrust: f64) {
        if let Some(ship) = self.world.ship.as_mut() {
            let n = direction.norm();
            if n > 0.0 {
                ship.body.v += direction / n * ship.thrust(base_thrust);
            }
        }
    }

    // ==================================================================================
    // input
    // ==================================================================================

    pub fn warp_up(&mut self) -> u32 {
        self.timewarp.increase()
    }

    pub fn warp_down(&mut self) -> u32 {
        self.timewarp.decrease()
    }

    pub fn reset_warp(&mut self) {
        self.timewarp.reset();
    }

    pub fn set_warp_level(&mut self, level: usize) -> u32 {
        self.timewarp.set_level(level)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.timewarp.toggle_pause()
    }

    pub fn toggle_trails(&mut self) -> bool {
        self.display.trails = !self.display.trails;
        self.throttle.invalidate();
        self.display.trails
    }

    pub fn toggle_collision_prediction(&mut self) -> bool {
        self.display.collision_prediction = !self.display.collision_prediction;
        self.throttle.invalidate();
        self.display.collision_prediction
    }

    pub fn toggle_ship_trajectory(&mut self) -> bool {
        self.display.ship_trajectory = !self.display.ship_trajectory;
        self.throttle.invalidate();
        self.display.ship_trajectory
    }

    // ==================================================================================
    // persistence
    // ==================================================================================

    pub fn snapshot(&self, selection: Selection) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, selection)
    }

    /// Replace the world with a restored one and re-seed accelerations.
    ///
    /// Returns the selection stored alongside it.
    pub fn load_snapshot(&mut self, snapshot: &WorldSnapshot) -> Selection {
        self.world = snapshot.restore();
        self.seed();
        self.forecast = Forecast::default();
        self.throttle.invalidate();
        info!(
            "loaded snapshot at t = {:.1}: {} stars, {} planets, {} comets",
            self.world.t,
            self.world.stars.len(),
            self.world.planets.len(),
            self.world.comets.len()
        );
        snapshot.selection.clone()
    }
}
