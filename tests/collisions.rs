use approx::assert_relative_eq;

use stellar_core::simulation::collisions::{is_colliding, CollisionConfig, CollisionEvent, CollisionResolver, MergePosition};
use stellar_core::simulation::states::{Body, BodyRole, NVec2, Ship, SimulationWorld};

fn planet_at(x: f64, y: f64, vx: f64, radius: f64) -> Body {
    Body::planet(NVec2::new(x, y), NVec2::new(vx, 0.0), radius)
}

fn world_with_planets(planets: Vec<Body>) -> SimulationWorld {
    SimulationWorld {
        planets,
        ..SimulationWorld::default()
    }
}

/// Ship at (110, 0) overlapping a resting planet of radius 100 at the origin
fn ship_hitting_planet(vx: f64) -> SimulationWorld {
    let mut world = world_with_planets(vec![planet_at(0.0, 0.0, 0.0, 100.0)]);
    world.ship = Some(Ship::new(NVec2::new(110.0, 0.0), NVec2::new(vx, 0.0)));
    world
}

// ==================================================================================
// Overlap test
// ==================================================================================

#[test]
fn overlap_is_strict() {
    let a = planet_at(0.0, 0.0, 0.0, 10.0);

    assert!(is_colliding(&a, &planet_at(29.99, 0.0, 0.0, 20.0)));
    assert!(!is_colliding(&a, &planet_at(30.01, 0.0, 0.0, 20.0)));
    assert!(!is_colliding(&a, &planet_at(30.0, 0.0, 0.0, 20.0)));
}

// ==================================================================================
// Planet merges
// ==================================================================================

#[test]
fn equal_planets_merge_head_on() {
    let mut world = world_with_planets(vec![
        planet_at(-90.0, 0.0, 5.0, 100.0),
        planet_at(90.0, 0.0, -5.0, 100.0),
    ]);

    let events = CollisionResolver::default().resolve(&mut world);

    assert_eq!(world.planets.len(), 1);
    let merged = &world.planets[0];
    assert_relative_eq!(merged.m, 100.0);
    assert_relative_eq!(merged.radius, 200.0);
    assert!(merged.v.norm() < 1e-12);
    assert!(merged.x.norm() < 1e-12);
    assert_eq!(merged.role, BodyRole::Planet);
    assert!(merged.prev_accel.is_none());

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], CollisionEvent::PlanetsMerged { mass, .. } if mass == 100.0));
}

#[test]
fn merge_keeps_momentum_and_places_at_barycenter() {
    let resolver = CollisionResolver::default();
    let a = Body::planet(NVec2::new(0.0, 0.0), NVec2::new(3.0, -1.0), 20.0);
    let b = Body::planet(NVec2::new(30.0, 0.0), NVec2::new(-1.0, 2.0), 60.0);

    let merged = resolver.merge(&a, &b);

    let before = a.momentum() + b.momentum();
    assert_relative_eq!(merged.momentum().x, before.x, max_relative = 1e-12);
    assert_relative_eq!(merged.momentum().y, before.y, max_relative = 1e-12);
    // masses 10 and 30
    assert_relative_eq!(merged.x.x, 22.5, max_relative = 1e-12);
}

#[test]
fn midpoint_merge_ignores_masses() {
    let resolver = CollisionResolver::new(CollisionConfig {
        merge_position: MergePosition::Midpoint,
        ..CollisionConfig::default()
    });
    let a = Body::planet(NVec2::new(0.0, 0.0), NVec2::zeros(), 20.0);
    let b = Body::planet(NVec2::new(30.0, 10.0), NVec2::zeros(), 60.0);

    let merged = resolver.merge(&a, &b);

    assert_relative_eq!(merged.x.x, 15.0);
    assert_relative_eq!(merged.x.y, 5.0);
}

#[test]
fn merges_cascade_until_nothing_overlaps() {
    // A-B overlap first; their product then swallows C
    let mut world = world_with_planets(vec![
        planet_at(0.0, 0.0, 0.0, 50.0),
        planet_at(60.0, 0.0, 0.0, 50.0),
        planet_at(120.0, 0.0, 0.0, 50.0),
    ]);

    let events = CollisionResolver::default().resolve(&mut world);

    assert_eq!(world.planets.len(), 1);
    assert_eq!(events.len(), 2);
    assert_relative_eq!(world.planets[0].m, 75.0);
    assert_relative_eq!(world.planets[0].radius, 150.0);
}

#[test]
fn disjoint_pairs_merge_in_one_pass() {
    let mut world = world_with_planets(vec![
        planet_at(0.0, 0.0, 0.0, 10.0),
        planet_at(5.0, 0.0, 0.0, 10.0),
        planet_at(10_000.0, 0.0, 0.0, 10.0),
        planet_at(10_005.0, 0.0, 0.0, 10.0),
        planet_at(50_000.0, 0.0, 0.0, 10.0),
    ]);

    let events = CollisionResolver::default().resolve(&mut world);

    assert_eq!(events.len(), 2);
    assert_eq!(world.planets.len(), 3);
    // untouched planet is still there
    assert!(world.planets.iter().any(|p| p.x.x == 50_000.0 && p.m == 5.0));
}

#[test]
fn separated_planets_do_not_merge() {
    let mut world = world_with_planets(vec![
        planet_at(0.0, 0.0, 0.0, 10.0),
        planet_at(25.0, 0.0, 0.0, 10.0),
    ]);

    assert!(CollisionResolver::default().resolve(&mut world).is_empty());
    assert_eq!(world.planets.len(), 2);
}

// ==================================================================================
// Comets
// ==================================================================================

#[test]
fn comet_is_destroyed_on_impact() {
    let mut world = world_with_planets(vec![planet_at(0.0, 0.0, 0.0, 100.0)]);
    world.comets.push(Body::comet(NVec2::new(50.0, 0.0), NVec2::new(-3.0, 0.0), 10.0));
    world.comets.push(Body::comet(NVec2::new(5_000.0, 0.0), NVec2::zeros(), 10.0));

    let events = CollisionResolver::default().resolve(&mut world);

    assert_eq!(world.comets.len(), 1);
    assert_relative_eq!(world.comets[0].x.x, 5_000.0);
    assert_eq!(
        events,
        vec![CollisionEvent::CometImpact {
            position: NVec2::new(50.0, 0.0),
            velocity: NVec2::new(-3.0, 0.0),
            target: BodyRole::Planet,
        }]
    );
}

#[test]
fn comet_hitting_star_reports_star() {
    let mut world = SimulationWorld::new();
    world.stars.push(Body::star(NVec2::zeros(), NVec2::zeros(), 500.0));
    world.comets.push(Body::comet(NVec2::new(0.0, 490.0), NVec2::zeros(), 5.0));

    let events = CollisionResolver::default().resolve(&mut world);

    assert!(world.comets.is_empty());
    assert!(matches!(events[0], CollisionEvent::CometImpact { target: BodyRole::Star, .. }));
}

#[test]
fn far_comets_escape() {
    let mut world = SimulationWorld::new();
    world.stars.push(Body::star(NVec2::zeros(), NVec2::zeros(), 500.0));
    world.comets.push(Body::comet(NVec2::new(70_000.0, 0.0), NVec2::zeros(), 5.0));
    world.comets.push(Body::comet(NVec2::new(1_000.0, 0.0), NVec2::zeros(), 5.0));

    let events = CollisionResolver::default().resolve(&mut world);

    assert_eq!(world.comets.len(), 1);
    assert_relative_eq!(world.comets[0].x.x, 1_000.0);
    assert!(matches!(events[0], CollisionEvent::CometEscaped { distance, .. } if distance == 70_000.0));
}

#[test]
fn escape_measures_from_origin_without_stars() {
    let mut world = SimulationWorld::new();
    world.comets.push(Body::comet(NVec2::new(0.0, 61_000.0), NVec2::zeros(), 5.0));

    CollisionResolver::default().resolve(&mut world);

    assert!(world.comets.is_empty());
}

// ==================================================================================
// Ship contacts
// ==================================================================================

#[test]
fn gentle_contact_bounces_ship() {
    let mut world = ship_hitting_planet(-2.0);

    let events = CollisionResolver::default().resolve(&mut world);

    let ship = world.ship.as_ref().expect("ship present");
    assert!(events.is_empty());
    assert_relative_eq!(ship.health, 100.0);
    assert_relative_eq!(ship.body.v.x, 0.6, max_relative = 1e-12);
    assert_relative_eq!(ship.body.v.y, 0.0);
    // planet radius + ship radius + 1
    assert_relative_eq!(ship.body.x.x, 117.0);
}

#[test]
fn hard_contact_damages_ship() {
    let mut world = ship_hitting_planet(-10.0);

    let events = CollisionResolver::default().resolve(&mut world);

    let ship = world.ship.as_ref().expect("ship present");
    assert_relative_eq!(ship.health, 90.0);
    assert_relative_eq!(ship.body.v.x, 3.0, max_relative = 1e-12);
    assert!(matches!(events[0], CollisionEvent::ShipDamaged { health, .. } if health == 90.0));
}

#[test]
fn violent_contact_destroys_ship() {
    let mut world = ship_hitting_planet(-25.0);

    let events = CollisionResolver::default().resolve(&mut world);

    let ship = world.ship.as_ref().expect("ship present");
    assert!(ship.is_destroyed());
    assert_eq!(ship.body.v, NVec2::zeros());
    assert_relative_eq!(ship.body.x.x, 117.0);
    assert!(matches!(events[0], CollisionEvent::ShipDestroyed { impact_speed, .. } if impact_speed == 25.0));

    // a wreck takes no further hits
    world.ship.as_mut().expect("ship present").body.x = NVec2::new(110.0, 0.0);
    assert!(CollisionResolver::default().resolve(&mut world).is_empty());
}

#[test]
fn bounce_is_relative_to_planet_motion() {
    let mut world = ship_hitting_planet(0.0);
    world.planets[0].v = NVec2::new(2.0, 0.0);

    CollisionResolver::default().resolve(&mut world);

    // relative velocity (-2, 0) reflects to (2, 0), damped, then carried by the planet
    let ship = world.ship.as_ref().expect("ship present");
    assert_relative_eq!(ship.body.v.x, 2.6, max_relative = 1e-12);
}
