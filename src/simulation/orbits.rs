//! Orbital mechanics helpers used when bodies are created.
//!
//! Velocities are tangential and counter-clockwise in screen space, i.e. the
//! tangent of an offset `(dx, dy)` is `(-dy, dx)`.

use crate::simulation::states::{Body, NVec2};

/// Circular orbital speed `sqrt(G M / r)`, zero for a degenerate radius.
#[allow(non_snake_case)]
pub fn orbital_speed(G: f64, central_mass: f64, r: f64) -> f64 {
    if r <= 0.0 || central_mass <= 0.0 {
        return 0.0;
    }
    (G * central_mass / r).sqrt()
}

/// Unit tangent of `offset`, zero for a zero offset.
fn tangent(offset: NVec2) -> NVec2 {
    let r = offset.norm();
    if r == 0.0 {
        return NVec2::zeros();
    }
    NVec2::new(-offset.y, offset.x) / r
}

/// Velocities for a two-body circular orbit about the shared barycenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalVelocity {
    pub planet: NVec2,
    pub star: NVec2, // counter-velocity that keeps total momentum zero
}

/// Circular two-body orbit of a planet around a star.
///
/// The pair orbits its barycenter at relative speed `sqrt(G (M + m) / r)`,
/// the planet taking the `M / (M + m)` share and the star the `m / (M + m)`
/// share in the opposite direction.
#[allow(non_snake_case)]
pub fn calculate_orbital_velocity(G: f64, planet_x: NVec2, planet_m: f64, star_x: NVec2, star_m: f64) -> OrbitalVelocity {
    let offset = planet_x - star_x;
    let total = star_m + planet_m;
    if total <= 0.0 {
        return OrbitalVelocity {
            planet: NVec2::zeros(),
            star: NVec2::zeros(),
        };
    }

    let speed = orbital_speed(G, total, offset.norm());
    let t = tangent(offset);

    OrbitalVelocity {
        planet: t * (speed * star_m / total),
        star: -t * (speed * planet_m / total),
    }
}

/// Put `planet` on a circular orbit around `star`.
///
/// The planet inherits the star's current motion and the star picks up the
/// counter-velocity.
#[allow(non_snake_case)]
pub fn place_in_orbit(G: f64, star: &mut Body, planet: &mut Body) {
    let ov = calculate_orbital_velocity(G, planet.x, planet.m, star.x, star.m);
    planet.v = ov.planet + star.v;
    star.v += ov.star;
}

/// Create a moon of `planet` at `distance` and `angle` (radians).
///
/// The planet-moon barycenter is sent on a circular orbit around `star`
/// and both bodies circle that barycenter. Updates the planet's velocity
/// and returns the moon.
#[allow(non_snake_case)]
pub fn create_moon_with_orbit(G: f64, star: &Body, planet: &mut Body, moon_radius: f64, distance: f64, angle: f64) -> Body {
    let dir = NVec2::new(angle.cos(), angle.sin());
    let mut moon = Body::planet(planet.x + dir * distance, NVec2::zeros(), moon_radius);

    let total = planet.m + moon.m;
    let barycenter = (planet.x * planet.m + moon.x * moon.m) / total;

    let bary_offset = barycenter - star.x;
    let bary_v = tangent(bary_offset) * orbital_speed(G, star.m, bary_offset.norm()) + star.v;

    // speeds around the barycenter, each body's share of the pair
    let planet_speed = if distance > 0.0 { (G * moon.m * moon.m / (total * distance)).sqrt() } else { 0.0 };
    let moon_speed = if distance > 0.0 { (G * planet.m * planet.m / (total * distance)).sqrt() } else { 0.0 };

    let perp = NVec2::new(-angle.sin(), angle.cos());
    planet.v = bary_v - perp * planet_speed;
    moon.v = bary_v + perp * moon_speed;

    moon
}
