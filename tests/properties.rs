use proptest::prelude::*;

use stellar_core::simulation::barnes_hut::{Bounds, PointMass, QuadTree};
use stellar_core::simulation::collisions::CollisionResolver;
use stellar_core::simulation::forces::{Acceleration, ForceLaw, NewtonianGravity, NewtonianGravityBarnesHut};
use stellar_core::simulation::params::Parameters;
use stellar_core::simulation::states::{Body, NVec2};
use stellar_core::simulation::timewarp::time_warp_settings;

fn point_mass() -> impl Strategy<Value = PointMass> {
    (-5000.0..5000.0f64, -5000.0..5000.0f64, 1.0..100.0f64, 0.0..10.0f64).prop_map(|(x, y, m, radius)| PointMass {
        x: NVec2::new(x, y),
        m,
        radius,
    })
}

fn planet() -> impl Strategy<Value = Body> {
    (-1000.0..1000.0f64, -1000.0..1000.0f64, -20.0..20.0f64, -20.0..20.0f64, 1.0..200.0f64)
        .prop_map(|(x, y, vx, vy, r)| Body::planet(NVec2::new(x, y), NVec2::new(vx, vy), r))
}

proptest! {
    // theta = 0 never approximates, so the tree must reproduce direct summation
    #[test]
    fn tree_without_approximation_matches_direct(bodies in prop::collection::vec(point_mass(), 2..30)) {
        let law = ForceLaw::from_params(&Parameters::default());
        let mut direct = vec![NVec2::zeros(); bodies.len()];
        let mut tree = vec![NVec2::zeros(); bodies.len()];

        NewtonianGravity { law }.acceleration(&bodies, &mut direct);
        NewtonianGravityBarnesHut { law, theta: 0.0, padding: 1000.0 }.acceleration(&bodies, &mut tree);

        for (d, t) in direct.iter().zip(tree.iter()) {
            prop_assert!((d - t).norm() <= 1e-9 * (1.0 + d.norm()), "direct {:?} vs tree {:?}", d, t);
        }
    }

    #[test]
    fn tree_aggregates_match_inputs(bodies in prop::collection::vec(point_mass(), 1..50)) {
        let mut tree = QuadTree::new(Bounds::new(-6000.0, -6000.0, 12_000.0, 12_000.0), 1, 0.5);
        for b in &bodies {
            prop_assert!(tree.insert(*b));
        }

        let mass: f64 = bodies.iter().map(|b| b.m).sum();
        let com = bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.x * b.m) / mass;

        prop_assert!((tree.total_mass() - mass).abs() <= 1e-9 * mass);
        prop_assert!((tree.center_of_mass() - com).norm() <= 1e-6);
        for node in &tree.nodes {
            prop_assert!(node.is_leaf() || node.bodies.is_empty());
        }
    }

    #[test]
    fn merge_conserves_mass_and_momentum(a in planet(), b in planet()) {
        let merged = CollisionResolver::default().merge(&a, &b);
        let p = a.momentum() + b.momentum();

        prop_assert!((merged.m - (a.m + b.m)).abs() <= 1e-12 * merged.m);
        prop_assert!((merged.momentum() - p).norm() <= 1e-9 * (1.0 + p.norm()));
        prop_assert!((merged.radius - 2.0 * merged.m).abs() <= 1e-9 * merged.radius);
    }

    #[test]
    fn warp_settings_cover_the_factor(factor in 1u32..=1000) {
        let s = time_warp_settings(factor);

        prop_assert!(s.steps >= 1);
        prop_assert!((1..=8).contains(&s.render_skip));
        prop_assert!(s.sub_time_step > 0.0 && s.sub_time_step <= 5.0);
        // each frame covers exactly `factor` units of simulated time
        let covered = f64::from(s.steps) * s.sub_time_step;
        prop_assert!((covered - f64::from(factor)).abs() <= 1e-9 * f64::from(factor));
    }
}
