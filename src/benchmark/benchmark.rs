use instant::Instant;

use crate::simulation::barnes_hut::PointMass;
use crate::simulation::forces::{Acceleration, ForceLaw, ForceSolver, NewtonianGravity, NewtonianGravityBarnesHut};
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, SimulationWorld};

/// Helper to build `n` deterministic point masses, no rand needed
fn make_points(n: usize) -> Vec<PointMass> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            PointMass {
                x: NVec2::new((i_f * 0.37).sin() * 20_000.0, (i_f * 0.13).cos() * 20_000.0),
                m: 10.0 + (i_f * 0.71).sin().abs() * 40.0,
                radius: 2.0,
            }
        })
        .collect()
}

/// Helper to build a world of one star and `n` planets
fn make_world(n: usize) -> SimulationWorld {
    let mut world = SimulationWorld::new();
    world.stars.push(Body::star(NVec2::zeros(), NVec2::zeros(), 500.0));
    world.planets = make_points(n)
        .into_iter()
        .map(|p| Body::planet(p.x, NVec2::zeros(), p.radius))
        .collect();
    world
}

/// Time one direct and one Barnes–Hut force pass for a range of n.
/// Prints CSV so the output can be pasted straight into a sheet.
pub fn bench_gravity() {
    let params = Parameters::default();
    let law = ForceLaw::from_params(&params);

    let direct = NewtonianGravity { law };
    let bh = NewtonianGravityBarnesHut {
        law,
        theta: params.theta,
        padding: params.padding,
    };

    println!("N,direct_ms,bh_ms");

    for n in [200, 400, 800, 1600, 3200, 6400] {
        let bodies = make_points(n);
        let mut out = vec![NVec2::zeros(); n];

        // Warm up
        direct.acceleration(&bodies, &mut out);
        bh.acceleration(&bodies, &mut out);

        let t0 = Instant::now();
        direct.acceleration(&bodies, &mut out);
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        bh.acceleration(&bodies, &mut out);
        let ms_bh = t1.elapsed().as_secs_f64() * 1000.0;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_bh);
    }
}

/// Time a full logical tick (4 sub-steps) with each solver.
pub fn bench_step() {
    let steps = 3;
    println!("N,direct_step_ms,bh_step_ms");

    for n in [200, 400, 800, 1600, 3200] {
        let mut timings = [0.0; 2];

        for (slot, barnes_hut) in [false, true].into_iter().enumerate() {
            let params = Parameters {
                barnes_hut,
                adaptive: false,
                ..Parameters::default()
            };
            let solver = ForceSolver::from_params(&params);
            let integrator = Integrator::from_params(&params);
            let mut world = make_world(n);
            integrator.seed_accelerations(&mut world, &solver);

            let t0 = Instant::now();
            for _ in 0..steps {
                integrator.advance(&mut world, &solver, params.time_step);
            }
            timings[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }

        println!("{},{:.6},{:.6}", n, timings[0], timings[1]);
    }
}
