//! Collision detection and response
//!
//! Runs after every physics tick, in this order:
//! 1. comets touching a star or planet are destroyed
//! 2. comets that wandered past the escape distance are dropped
//! 3. overlapping planets merge, repeated until nothing overlaps
//! 4. the ship bounces off (or is wrecked by) any planet it touches
//!
//! Every outcome is reported as a [`CollisionEvent`] so the caller can drive
//! effects without the core knowing about them.

use log::{debug, info};

use crate::simulation::states::{Body, BodyRole, NVec2, SimulationWorld, PLANET_MASS_PER_RADIUS};

/// How the merged planet is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePosition {
    #[default]
    MassWeighted, // barycenter of the pair
    Midpoint, // arithmetic mean of the two centers
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    pub merge_position: MergePosition,
    pub restitution: f64, // ship bounce damping
    pub damage_threshold: f64, // normal impact speed that hurts
    pub fatal_threshold: f64, // normal impact speed that wrecks the ship
    pub damage: f64, // health lost per damaging hit
    pub escape_distance: f64, // comets beyond this from every star are dropped
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            merge_position: MergePosition::MassWeighted,
            restitution: 0.3,
            damage_threshold: 7.5,
            fatal_threshold: 20.0,
            damage: 10.0,
            escape_distance: 60_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollisionEvent {
    /// A comet hit a star or planet and was destroyed.
    CometImpact {
        position: NVec2,
        velocity: NVec2,
        target: BodyRole,
    },
    /// A comet left the system.
    CometEscaped { position: NVec2, distance: f64 },
    /// Two planets became one.
    PlanetsMerged {
        position: NVec2,
        velocity: NVec2,
        mass: f64,
        radius: f64,
    },
    /// The ship lost health but survived.
    ShipDamaged { position: NVec2, impact_speed: f64, health: f64 },
    /// The ship hit hard enough to be wrecked.
    ShipDestroyed { position: NVec2, impact_speed: f64 },
}

/// Overlap test, strict: touching exactly at `r_a + r_b` is not a collision.
pub fn is_colliding(a: &Body, b: &Body) -> bool {
    a.distance_to(b) < a.radius + b.radius
}

#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    pub config: CollisionConfig,
}

impl CollisionResolver {
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Apply every collision rule to the world and report what happened.
    pub fn resolve(&self, world: &mut SimulationWorld) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        self.resolve_comet_impacts(world, &mut events);
        self.resolve_comet_escapes(world, &mut events);
        self.resolve_planet_merges(world, &mut events);
        self.resolve_ship_contacts(world, &mut events);
        events
    }

    fn resolve_comet_impacts(&self, world: &mut SimulationWorld, events: &mut Vec<CollisionEvent>) {
        let SimulationWorld { stars, planets, comets, .. } = world;

        comets.retain(|comet| {
            let hit = stars
                .iter()
                .chain(planets.iter())
                .find(|body| is_colliding(body, comet));

            match hit {
                Some(body) => {
                    info!("comet impact on {:?} at ({:.0}, {:.0})", body.role, comet.x.x, comet.x.y);
                    events.push(CollisionEvent::CometImpact {
                        position: comet.x,
                        velocity: comet.v,
                        target: body.role,
                    });
                    false
                }
                None => true,
            }
        });
    }

    fn resolve_comet_escapes(&self, world: &mut SimulationWorld, events: &mut Vec<CollisionEvent>) {
        let escape = self.config.escape_distance;
        let distances: Vec<f64> = world
            .comets
            .iter()
            .map(|c| world.distance_to_nearest_star(&c.x))
            .collect();

        let mut d = distances.into_iter();
        world.comets.retain(|comet| {
            let dist = d.next().unwrap_or(0.0);
            if dist > escape {
                debug!("comet escaped at distance {:.0}", dist);
                events.push(CollisionEvent::CometEscaped { position: comet.x, distance: dist });
                false
            } else {
                true
            }
        });
    }

    /// Merge overlapping planets.
    ///
    /// Each pass scans every pair and stages merges for disjoint colliding
    /// pairs, then applies them all at once: the lower index is replaced by
    /// the merged body and the higher index removed. Passes repeat until
    /// nothing is staged, so cascades settle within one call.
    pub fn resolve_planet_merges(&self, world: &mut SimulationWorld, events: &mut Vec<CollisionEvent>) {
        loop {
            let staged = stage_merges(&world.planets);
            if staged.is_empty() {
                return;
            }

            let mut removed = Vec::with_capacity(staged.len());
            for (i, j) in staged {
                let merged = self.merge(&world.planets[i], &world.planets[j]);
                info!(
                    "planets merged: mass {:.1}, radius {:.1} at ({:.0}, {:.0})",
                    merged.m, merged.radius, merged.x.x, merged.x.y
                );
                events.push(CollisionEvent::PlanetsMerged {
                    position: merged.x,
                    velocity: merged.v,
                    mass: merged.m,
                    radius: merged.radius,
                });
                world.planets[i] = merged;
                removed.push(j);
            }

            // highest index first so earlier removals don't shift later ones
            removed.sort_unstable_by(|a, b| b.cmp(a));
            for j in removed {
                world.planets.remove(j);
            }
        }
    }

    /// Inelastic merge of two planets.
    ///
    /// Mass adds, velocity is the mass-weighted average (momentum is kept),
    /// radius follows the planet density `r = m / 0.5`.
    pub fn merge(&self, a: &Body, b: &Body) -> Body {
        let m = a.m + b.m;
        let v = (a.momentum() + b.momentum()) / m;
        let x = match self.config.merge_position {
            MergePosition::MassWeighted => (a.x * a.m + b.x * b.m) / m,
            MergePosition::Midpoint => (a.x + b.x) * 0.5,
        };
        Body::with_mass(BodyRole::Planet, x, v, m, m / PLANET_MASS_PER_RADIUS)
    }

    /// Bounce the ship off every planet it overlaps.
    ///
    /// With `n` the unit normal from planet to ship and `dot` the normal
    /// component of the relative velocity:
    /// - `|dot| > damage_threshold` costs `damage` health,
    /// - `|dot| > fatal_threshold` wrecks the ship and stops it dead,
    /// - otherwise the relative velocity is reflected about `n` and scaled by
    ///   the restitution.
    ///
    /// The ship is then moved just outside the planet along `n`.
    pub fn resolve_ship_contacts(&self, world: &mut SimulationWorld, events: &mut Vec<CollisionEvent>) {
        let Some(ship) = world.ship.as_mut() else {
            return;
        };
        let c = &self.config;

        for planet in &world.planets {
            if ship.is_destroyed() {
                return;
            }
            if !is_colliding(&ship.body, planet) {
                continue;
            }

            let offset = ship.body.x - planet.x;
            let dist = offset.norm();
            if dist == 0.0 {
                continue; // no usable normal
            }
            let n = offset / dist;

            let rel = ship.body.v - planet.v;
            let dot = rel.dot(&n);
            let impact_speed = dot.abs();

            if impact_speed > c.fatal_threshold {
                ship.health = 0.0;
                ship.body.v = NVec2::zeros();
                info!("ship destroyed, impact speed {:.1}", impact_speed);
                events.push(CollisionEvent::ShipDestroyed {
                    position: ship.body.x,
                    impact_speed,
                });
            } else {
                if impact_speed > c.damage_threshold {
                    ship.health -= c.damage;
                    info!("ship damaged, impact speed {:.1}, health {}", impact_speed, ship.health);
                    events.push(CollisionEvent::ShipDamaged {
                        position: ship.body.x,
                        impact_speed,
                        health: ship.health,
                    });
                }
                ship.body.v = planet.v + (rel - n * (2.0 * dot)) * c.restitution;
            }

            ship.body.x = planet.x + n * (ship.body.radius + planet.radius + 1.0);
            ship.body.prev_accel = None;
        }
    }
}

/// Disjoint colliding pairs `(i, j)`, `i < j`, in scan order.
fn stage_merges(planets: &[Body]) -> Vec<(usize, usize)> {
    let mut taken = vec![false; planets.len()];
    let mut staged = Vec::new();

    for i in 0..planets.len() {
        if taken[i] {
            continue;
        }
        for j in (i + 1)..planets.len() {
            if !taken[j] && is_colliding(&planets[i], &planets[j]) {
                taken[i] = true;
                taken[j] = true;
                staged.push((i, j));
                break;
            }
        }
    }
    staged
}
