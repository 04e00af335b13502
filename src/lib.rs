pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{Body, BodyRef, BodyRole, NVec2, Ship, SimulationWorld};
pub use simulation::params::Parameters;
pub use simulation::barnes_hut::{Bounds, PointMass, QuadTree};
pub use simulation::forces::{Acceleration, ForceLaw, ForceSolver, NewtonianGravity, NewtonianGravityBarnesHut};
pub use simulation::integrator::{semi_implicit_euler, Integrator};
pub use simulation::timewarp::{time_warp_settings, FramePlan, TimewarpScheduler, WarpSettings};
pub use simulation::collisions::{is_colliding, CollisionConfig, CollisionEvent, CollisionResolver, MergePosition};
pub use simulation::prediction::{Forecast, ForecastRequest, OrbitPredictor, PathPoint, PredictedCollision, PredictionConfig, PredictionThrottle};
pub use simulation::orbits::{calculate_orbital_velocity, create_moon_with_orbit, orbital_speed, place_in_orbit, OrbitalVelocity};
pub use simulation::spawner::{CometSpawner, SpawnerConfig};
pub use simulation::snapshot::{Selection, WorldSnapshot};
pub use simulation::engine::{DisplayToggles, Engine, TickReport};
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, EngineConfig, MergePositionConfig, MoonConfig, ParametersConfig, ScenarioConfig, ShipConfig};

pub use benchmark::benchmark::{bench_gravity, bench_step};
