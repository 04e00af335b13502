//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant, softening and contact buffer (`G`, `eps`, `contact_buffer`),
//! - Barnes-Hut switch, opening threshold and root padding,
//! - base time step, sub-steps and the adaptive close-approach rule,
//! - comet gravity switch and the random seed

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub eps: f64, // softening added to distance squared
    pub contact_buffer: f64, // added to r_a + r_b, no force inside that distance
    pub barnes_hut: bool, // false = direct n^2 sum
    pub theta: f64, // opening threshold s/d
    pub padding: f64, // root bounds padding per side
    pub time_step: f64, // logical tick length at 1x warp
    pub sub_steps: usize, // integration steps per logical tick
    pub adaptive: bool, // shrink dt on close planet approaches
    pub close_approach_ratio: f64, // separation/combined radius that triggers shrinking
    pub min_step_factor: f64, // floor of the shrink factor
    pub comets_exert_gravity: bool, // comets join the massive set
    pub seed: u64, // deterministic seed for the spawner
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: 20.0,
            eps: 1e-6,
            contact_buffer: 5.0,
            barnes_hut: true,
            theta: 0.5,
            padding: 1000.0,
            time_step: 1.0,
            sub_steps: 4,
            adaptive: true,
            close_approach_ratio: 10.0,
            min_step_factor: 0.1,
            comets_exert_gravity: false,
            seed: 42,
        }
    }
}
