//! Wall-clock micro-benchmarks of the hot loops
//!
//! Plain functions with `std::time::Instant`, printed as tables;
//! initial conditions are a deterministic sin/cos lattice so no RNG is
//! needed and runs are comparable

use std::time::Instant;

use crate::maths::vector::Vec2;
use crate::simulation::engine::{BoundaryPolicy, Domain, Engine};
use crate::simulation::forces::{AccelSet, Acceleration, BodyAccumulators, PairwiseGravity};
use crate::simulation::integrator::Method;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, System};
use crate::simulation::system::update;

/// Deterministic n-body system spread over a ±5 square
fn lattice_system(n: usize) -> System {
    let mut sys = System::new();
    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = Vec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
        sys.add_dynamic(
            Body::new(x)
                .with_mass(1.0)
                .with_radius(0.01),
        );
    }
    sys
}

/// Time one full pairwise-gravity accumulation at several system sizes
pub fn bench_pairwise_gravity() {
    let ns = [200, 400, 800, 1600, 3200];

    println!("pairwise gravity accumulation");
    println!("{:>8} {:>12} {:>14}", "n", "ms/eval", "ns/pair");

    for n in ns {
        let sys = lattice_system(n);
        let gravity = PairwiseGravity {
            g: 1.0,
            min_separation: 1e-4,
            cutoff_radius: f64::INFINITY,
        };
        let mut out = vec![Vec2::zeros(); sys.dynamics.slot_count()];

        // Warm up once so allocation noise stays out of the timing
        gravity.acceleration(0.0, &sys, &mut out);

        let reps = (2_000_000 / (n * n)).max(1);
        let start = Instant::now();
        for _ in 0..reps {
            for a in out.iter_mut() {
                *a = Vec2::zeros();
            }
            gravity.acceleration(0.0, &sys, &mut out);
        }
        let elapsed = start.elapsed();

        let per_eval = elapsed.as_secs_f64() * 1e3 / reps as f64;
        let pairs = (n * (n - 1)) / 2;
        let per_pair = elapsed.as_secs_f64() * 1e9 / (reps * pairs) as f64;
        println!("{n:>8} {per_eval:>12.3} {per_pair:>14.1}");
    }
}

/// Time the full step (integrate + boundary + collision pass)
pub fn bench_update() {
    let ns = [50, 100, 200, 400];

    println!("full update step");
    println!("{:>8} {:>12}", "n", "ms/step");

    for n in ns {
        let mut sys = lattice_system(n);
        let forces = AccelSet::new().with(BodyAccumulators).with(PairwiseGravity {
            g: 1e-3,
            min_separation: 1e-3,
            cutoff_radius: f64::INFINITY,
        });
        let engine = Engine {
            method: Method::Verlet,
            boundary: BoundaryPolicy::Reflect,
            domain: Domain {
                x_min: -10.0,
                x_max: 10.0,
                y_min: -10.0,
                y_max: 10.0,
            },
        };
        let params = Parameters::default();

        let reps = (100_000 / (n * n)).max(2);
        let start = Instant::now();
        for _ in 0..reps {
            update(&mut sys, &forces, &engine, &params, 0.005);
        }
        let elapsed = start.elapsed();

        let per_step = elapsed.as_secs_f64() * 1e3 / reps as f64;
        println!("{n:>8} {per_step:>12.3}");
    }
}
