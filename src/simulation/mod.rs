pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod barnes_hut;
pub mod timewarp;
pub mod collisions;
pub mod prediction;
pub mod orbits;
pub mod spawner;
pub mod snapshot;
