use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;

use stellar_core::configuration::config::{MergePositionConfig, ScenarioConfig};
use stellar_core::simulation::collisions::MergePosition;
use stellar_core::simulation::scenario::Scenario;
use stellar_core::SimError;

/// Load a scenario YAML from the crate's `scenarios/` directory
fn load(file_name: &str) -> ScenarioConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let text = fs::read_to_string(&path).expect("scenario file should exist");
    ScenarioConfig::from_yaml(&text).expect("scenario should parse")
}

fn minimal(extra: &str) -> ScenarioConfig {
    let text = format!(
        "{extra}
bodies:
  - role: star
    x: [0.0, 0.0]
    radius: 500.0
  - role: planet
    x: [3000.0, 0.0]
    radius: 20.0
"
    );
    ScenarioConfig::from_yaml(&text).expect("inline scenario should parse")
}

// ==================================================================================
// Loading
// ==================================================================================

#[test]
fn load_scenario_from_yaml() {
    let cfg = load("test_file.yaml");

    assert_eq!(cfg.bodies.len(), 2);
    assert_relative_eq!(cfg.parameters.G, 20.0);
    // untouched sections fall back to defaults
    assert!(cfg.engine.barnes_hut);
    assert_eq!(cfg.engine.sub_steps, 4);
    assert_eq!(cfg.engine.warp_ladder, vec![1, 2, 5, 10, 25]);
    assert!(!cfg.spawner.enabled);
    assert!(cfg.ship.is_none());
}

#[test]
fn orbit_gives_tangential_velocities() {
    let scenario = Scenario::build_scenario(load("test_file.yaml")).expect("valid scenario");
    let world = &scenario.world;

    assert_eq!(world.stars.len(), 1);
    assert_eq!(world.planets.len(), 1);
    assert_relative_eq!(world.stars[0].m, 1000.0);
    assert_relative_eq!(world.planets[0].m, 1.0);

    let planet = &world.planets[0];
    assert!(planet.v.x.abs() < 1e-12);
    assert!(planet.v.y > 0.0);
    assert!(world.stars[0].v.y < 0.0);
    assert!(world.total_momentum().norm() < 1e-12);

    // relative speed is the circular speed of the pair
    let rel = (planet.v - world.stars[0].v).norm();
    assert_relative_eq!(rel, (20.0_f64 * 1001.0 / 3000.0).sqrt(), max_relative = 1e-12);
}

#[test]
fn solar_system_builds_every_section() {
    let scenario = Scenario::build_scenario(load("solar_system.yaml")).expect("valid scenario");

    assert_eq!(scenario.world.stars.len(), 2);
    assert_eq!(scenario.world.planets.len(), 6, "five planets plus one moon");
    assert!(scenario.world.ship.is_some());
    assert!(scenario.spawner.is_some());
    assert!(scenario.display.trails);
    assert!(scenario.display.collision_prediction);
    assert!(!scenario.display.ship_trajectory);
    assert_eq!(scenario.parameters.seed, 7);
    assert_relative_eq!(scenario.collisions.escape_distance, 60_000.0);
    assert_relative_eq!(scenario.prediction.comet_escape_distance, 100_000.0);

    // the companion star's planets ride along with it
    let companion_vy = scenario.world.stars[1].v.y;
    assert!(companion_vy > 0.0);
    assert!(scenario.world.planets[3].v.y > companion_vy);
}

#[test]
fn moon_and_planet_share_a_barycenter_orbit() {
    let scenario = Scenario::build_scenario(load("solar_system.yaml")).expect("valid scenario");
    let planet = &scenario.world.planets[1];
    let moon = &scenario.world.planets[5];

    assert_relative_eq!(moon.radius, 40.0);
    assert_relative_eq!((moon.x - planet.x).norm(), 310.0, max_relative = 1e-9);

    let total = planet.m + moon.m;
    let bary_x = (planet.x * planet.m + moon.x * moon.m) / total;
    let bary_v = (planet.momentum() + moon.momentum()) / total;

    let star = &scenario.world.stars[0];
    let expected = (20.0 * star.m / (bary_x - star.x).norm()).sqrt();
    assert_relative_eq!((bary_v - star.v).norm(), expected, max_relative = 1e-9);
}

#[test]
fn merge_position_is_configurable() {
    let cfg = minimal("engine:\n  merge_position: \"midpoint\"\n");
    assert_eq!(cfg.engine.merge_position, MergePositionConfig::Midpoint);

    let scenario = Scenario::build_scenario(cfg).expect("valid scenario");
    assert_eq!(scenario.collisions.merge_position, MergePosition::Midpoint);
}

#[test]
fn explicit_mass_overrides_radius() {
    let cfg = ScenarioConfig::from_yaml(
        "bodies:
  - role: planet
    x: [0.0, 0.0]
    radius: 10.0
    m: 123.0
",
    )
    .expect("inline scenario should parse");

    let scenario = Scenario::build_scenario(cfg).expect("valid scenario");
    assert_relative_eq!(scenario.world.planets[0].m, 123.0);
}

#[test]
fn unknown_role_fails_to_parse() {
    let result = ScenarioConfig::from_yaml("bodies:\n  - role: nebula\n    x: [0.0, 0.0]\n    radius: 1.0\n");
    assert!(matches!(result, Err(SimError::Yaml(_))));
}

// ==================================================================================
// Validation
// ==================================================================================

#[test]
fn rejects_non_positive_theta() {
    let result = Scenario::build_scenario(minimal("engine:\n  theta: 0.0\n"));
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}

#[test]
fn rejects_zero_sub_steps_and_empty_ladder() {
    assert!(minimal("engine:\n  sub_steps: 0\n").validate().is_err());
    assert!(minimal("engine:\n  warp_ladder: []\n").validate().is_err());
    assert!(minimal("engine:\n  warp_ladder: [0, 1, 2]\n").validate().is_err());
    assert!(minimal("engine:\n  warp_ladder: [1, 3]\n").validate().is_ok());
    assert!(minimal("prediction:\n  sample_every: 0\n").validate().is_err());
    assert!(minimal("parameters:\n  time_step: -1.0\n").validate().is_err());
}

#[test]
fn rejects_negative_radius() {
    let mut cfg = minimal("");
    cfg.bodies[1].radius = -5.0;

    let err = cfg.validate().expect_err("negative radius must be rejected");
    assert!(matches!(err, SimError::InvalidBody { index: 1, .. }), "got {err}");
}

#[test]
fn rejects_orbit_around_a_planet() {
    let mut cfg = minimal("");
    cfg.bodies[0].orbit = Some(1);

    assert!(matches!(cfg.validate(), Err(SimError::InvalidBody { index: 0, .. })));

    cfg.bodies[0].orbit = Some(0);
    assert!(cfg.validate().is_err(), "a body cannot orbit itself");
}

#[test]
fn rejects_moon_of_a_star() {
    let cfg = minimal("moons:\n  - planet: 0\n    radius: 5.0\n    distance: 100.0\n");
    assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));

    let ok = minimal("moons:\n  - planet: 1\n    radius: 5.0\n    distance: 100.0\n");
    assert!(ok.validate().is_ok());
}

#[test]
fn rejects_ship_in_body_list() {
    let mut cfg = minimal("");
    cfg.bodies[1].role = stellar_core::BodyRole::Ship;

    assert!(matches!(cfg.validate(), Err(SimError::InvalidBody { index: 1, .. })));
}
