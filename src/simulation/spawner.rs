//! Comet spawning
//!
//! Comets appear around a star at a random angle and an outward-biased
//! random distance, moving tangentially at a fraction of the local circular
//! speed. The spawner owns a seeded RNG so runs can be replayed.

use std::f64::consts::TAU;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::orbits::orbital_speed;
use crate::simulation::states::{Body, NVec2, SimulationWorld};

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerConfig {
    pub interval_frames: u64, // frames between spawn attempts
    pub max_comets: usize,
    pub min_distance: f64, // from the first star
    pub max_distance: f64,
    pub secondary_min_distance: f64, // local band around any other star
    pub secondary_max_distance: f64,
    pub min_radius: u32,
    pub max_radius: u32, // exclusive
    pub min_speed_factor: f64, // fraction of the circular speed
    pub max_speed_factor: f64,
    pub primary_weight: f64, // chance of picking the first star when there are several
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_frames: 60,
            max_comets: 30,
            min_distance: 20_000.0,
            max_distance: 40_000.0,
            secondary_min_distance: 5_000.0,
            secondary_max_distance: 15_000.0,
            min_radius: 5,
            max_radius: 20,
            min_speed_factor: 0.1,
            max_speed_factor: 0.5,
            primary_weight: 0.7,
        }
    }
}

pub struct CometSpawner {
    pub config: SpawnerConfig,
    rng: StdRng,
}

impl CometSpawner {
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A new comet around `star` in the primary distance band.
    #[allow(non_snake_case)]
    pub fn spawn_comet(&mut self, star: &Body, G: f64) -> Body {
        let band = (self.config.min_distance, self.config.max_distance);
        self.spawn_comet_between(star, G, band)
    }

    /// A new comet around `star` at a distance inside `band`.
    ///
    /// Distance is `min + (max - min) * sqrt(u)` which favours the outer
    /// region, and never closer than just outside the star's surface.
    #[allow(non_snake_case)]
    pub fn spawn_comet_between(&mut self, star: &Body, G: f64, band: (f64, f64)) -> Body {
        let c = &self.config;
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = f64::from(self.rng.gen_range(c.min_radius..c.max_radius.max(c.min_radius + 1)));

        let floor = star.radius + radius + 1.0;
        let lo = band.0.max(floor);
        let hi = band.1.max(lo);
        let dist = lo + (hi - lo) * self.rng.gen::<f64>().sqrt();

        let dir = NVec2::new(angle.cos(), angle.sin());
        let speed_factor = self.rng.gen_range(c.min_speed_factor..=c.max_speed_factor.max(c.min_speed_factor));
        let speed = orbital_speed(G, star.m, dist) * speed_factor;
        let tangent = NVec2::new(-dir.y, dir.x);

        Body::comet(star.x + dir * dist, tangent * speed + star.v, radius)
    }

    /// Spawn around a star every `interval_frames` frames while below the cap.
    ///
    /// Comets around the first star use the primary band, comets around any
    /// other star stay in its local secondary band.
    ///
    /// Returns true when a comet was added.
    #[allow(non_snake_case)]
    pub fn maybe_spawn(&mut self, world: &mut SimulationWorld, G: f64, frame: u64) -> bool {
        let interval = self.config.interval_frames.max(1);
        if frame % interval != 0 || world.comets.len() >= self.config.max_comets || world.stars.is_empty() {
            return false;
        }

        let idx = if world.stars.len() > 1 && !self.rng.gen_bool(self.config.primary_weight.clamp(0.0, 1.0)) {
            self.rng.gen_range(1..world.stars.len())
        } else {
            0
        };

        let band = if idx == 0 {
            (self.config.min_distance, self.config.max_distance)
        } else {
            (self.config.secondary_min_distance, self.config.secondary_max_distance)
        };
        let comet = self.spawn_comet_between(&world.stars[idx], G, band);
        info!(
            "spawned comet around star {} at distance {:.0}",
            idx,
            world.stars[idx].distance_to(&comet)
        );
        world.comets.push(comet);
        true
    }
}
