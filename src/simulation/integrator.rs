//! Time integrators for the sandbox world
//!
//! Stars, planets and comets advance with velocity-Verlet driven by a
//! cached per-body acceleration (`Body::prev_accel`). The ship advances with
//! semi-implicit Euler in the one-way field of stars and planets.
//!
//! A logical tick is split into `sub_steps` smaller steps, each with a full
//! force recomputation, and the tick itself is shortened when two planets
//! are within a few combined radii of each other.

use crate::simulation::barnes_hut::PointMass;
use crate::simulation::forces::ForceSolver;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, SimulationWorld};

#[derive(Debug, Clone, PartialEq)]
pub struct Integrator {
    pub sub_steps: usize, // integration steps per logical tick
    pub adaptive: bool, // shrink dt on close planet approaches
    pub close_approach_ratio: f64, // separation/combined radius that triggers shrinking
    pub min_step_factor: f64, // floor of the shrink factor
    pub comets_exert_gravity: bool, // comets join the massive set
    pub ship_verlet: bool, // ship rides along as a verlet probe instead of Euler
}

impl Default for Integrator {
    fn default() -> Self {
        Self::from_params(&Parameters::default())
    }
}

impl Integrator {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            sub_steps: p.sub_steps,
            adaptive: p.adaptive,
            close_approach_ratio: p.close_approach_ratio,
            min_step_factor: p.min_step_factor,
            comets_exert_gravity: p.comets_exert_gravity,
            ship_verlet: false,
        }
    }

    /// Tick length after the close-approach rule.
    ///
    /// Finds the smallest `separation / (r_i + r_j)` over all planet pairs;
    /// when it lies in `(0, close_approach_ratio)` the step is scaled by
    /// `max(min_step_factor, ratio / close_approach_ratio)`.
    pub fn adaptive_time_step(&self, planets: &[Body], time_step: f64) -> f64 {
        let mut min_ratio = f64::INFINITY;

        for i in 0..planets.len() {
            for j in (i + 1)..planets.len() {
                let combined = planets[i].radius + planets[j].radius;
                if combined <= 0.0 {
                    continue;
                }
                let ratio = planets[i].distance_to(&planets[j]) / combined;
                min_ratio = min_ratio.min(ratio);
            }
        }

        if min_ratio > 0.0 && min_ratio < self.close_approach_ratio {
            let factor = (min_ratio / self.close_approach_ratio).max(self.min_step_factor);
            log::debug!(
                "adaptive time step {:.3} (factor {:.3}, min separation {:.1} radii)",
                time_step * factor,
                factor,
                min_ratio
            );
            return time_step * factor;
        }
        time_step
    }

    /// Advance the world by one logical tick of length `time_step`.
    ///
    /// Returns the time actually applied (after adaptive scaling) and adds
    /// it to `world.t`.
    pub fn advance(&self, world: &mut SimulationWorld, solver: &ForceSolver, time_step: f64) -> f64 {
        let applied = if self.adaptive {
            self.adaptive_time_step(&world.planets, time_step)
        } else {
            time_step
        };

        let n = self.sub_steps.max(1);
        let h = applied / n as f64;
        for _ in 0..n {
            self.sub_step(world, solver, h);
        }

        world.t += applied;
        applied
    }

    /// Fill every missing `prev_accel` from the forces at the current positions.
    ///
    /// Called when bodies are created or restored so that the first verlet
    /// drift uses a real acceleration instead of zero.
    pub fn seed_accelerations(&self, world: &mut SimulationWorld, solver: &ForceSolver) {
        let (mut massive, mut probes) = self.partition(world);
        seed_missing(&mut massive, &mut probes, solver);
    }

    /// One velocity-Verlet sub-step for every body plus an Euler step for the ship.
    fn sub_step(&self, world: &mut SimulationWorld, solver: &ForceSolver, h: f64) {
        // Ship first, it sees the sources where they stand at the start of the step
        if let Some(ship) = world.ship.as_mut().filter(|_| !self.ship_verlet) {
            if !ship.is_destroyed() {
                let sources = world
                    .stars
                    .iter()
                    .chain(world.planets.iter())
                    .map(Body::point_mass)
                    .collect::<Vec<_>>();
                let a = solver.field_at(&sources, &ship.body.point_mass());
                semi_implicit_euler(&mut ship.body, a, h);
            }
        }

        let (mut massive, mut probes) = self.partition(world);
        seed_missing(&mut massive, &mut probes, solver);

        verlet_drift(&mut massive, h);
        verlet_drift(&mut probes, h);

        let (a_massive, a_probes) = evaluate(&massive, &probes, solver);

        verlet_kick(&mut massive, &a_massive, h);
        verlet_kick(&mut probes, &a_probes, h);
    }

    /// Split the world into bodies that pull on each other and probes that
    /// only feel the field: comets (unless configured to gravitate) and, with
    /// `ship_verlet`, a ship that is still flying.
    fn partition<'w>(&self, world: &'w mut SimulationWorld) -> (Vec<&'w mut Body>, Vec<&'w mut Body>) {
        let SimulationWorld { stars, planets, comets, ship, .. } = world;

        let mut massive: Vec<&mut Body> = stars.iter_mut().chain(planets.iter_mut()).collect();
        let mut probes: Vec<&mut Body> = Vec::new();

        if self.comets_exert_gravity {
            massive.extend(comets.iter_mut());
        } else {
            probes.extend(comets.iter_mut());
        }
        if self.ship_verlet {
            if let Some(ship) = ship.as_mut().filter(|s| !s.is_destroyed()) {
                probes.push(&mut ship.body);
            }
        }
        (massive, probes)
    }
}

/// Accelerations at the current positions: mutual for `massive`, one-way for `probes`.
fn evaluate(massive: &[&mut Body], probes: &[&mut Body], solver: &ForceSolver) -> (Vec<NVec2>, Vec<NVec2>) {
    let sources: Vec<PointMass> = massive.iter().map(|b| b.point_mass()).collect();
    let probe_pm: Vec<PointMass> = probes.iter().map(|b| b.point_mass()).collect();

    (solver.compute_forces(&sources), solver.field_at_many(&sources, &probe_pm))
}

fn seed_missing(massive: &mut [&mut Body], probes: &mut [&mut Body], solver: &ForceSolver) {
    let cold = massive.iter().chain(probes.iter()).any(|b| b.prev_accel.is_none());
    if !cold {
        return;
    }

    let (a_massive, a_probes) = evaluate(massive, probes, solver);
    for (b, a) in massive.iter_mut().zip(a_massive) {
        b.prev_accel.get_or_insert(a);
    }
    for (b, a) in probes.iter_mut().zip(a_probes) {
        b.prev_accel.get_or_insert(a);
    }
}

/// Drift: x(t+h) = x(t) + v(t) h + 0.5 a(t) h²
pub fn verlet_drift(bodies: &mut [&mut Body], h: f64) {
    for b in bodies.iter_mut() {
        let a = b.prev_accel.unwrap_or_else(NVec2::zeros);
        b.x += b.v * h + a * (0.5 * h * h);
    }
}

/// Kick: v(t+h) = v(t) + 0.5 (a(t) + a(t+h)) h, then cache a(t+h)
pub fn verlet_kick(bodies: &mut [&mut Body], a_new: &[NVec2], h: f64) {
    for (b, a) in bodies.iter_mut().zip(a_new.iter()) {
        let a_old = b.prev_accel.unwrap_or(*a);
        b.v += (a_old + a) * (0.5 * h);
        b.prev_accel = Some(*a);
    }
}

/// Semi-implicit Euler: velocity first, then position with the new velocity
pub fn semi_implicit_euler(body: &mut Body, a: NVec2, h: f64) {
    body.v += a * h;
    body.x += body.v * h;
}
