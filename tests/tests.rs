use orbsim::collision::detect::detect;
use orbsim::collision::resolve::{resolve_dynamic, resolve_static};
use orbsim::simulation::forces::{
    AccelSet, Acceleration, BodyAccumulators, PairwiseGravity, UniformGravity,
};
use orbsim::simulation::integrator::{integrate, IntegrateError, Method};
use orbsim::simulation::system::update;
use orbsim::{
    Body, BodyArena, BoundaryPolicy, Collider, Contact, Domain, Engine, Parameters, Scenario,
    ScenarioConfig, System, Vec2,
};

/// Build a two-circle system out of bare (collider-less) bodies
/// Bare bodies collide as spheres of their own radius
pub fn two_circles(
    a: (Vec2, Vec2, f64, f64),
    b: (Vec2, Vec2, f64, f64),
) -> (Body, Body) {
    let make = |(x, v, m, r): (Vec2, Vec2, f64, f64)| {
        Body::new(x).with_velocity(v).with_mass(m).with_radius(r)
    };
    (make(a), make(b))
}

/// Force set with only the per-body accumulators (no field terms)
pub fn no_field_forces() -> AccelSet {
    AccelSet::new().with(BodyAccumulators)
}

/// Engine over the unit square
pub fn unit_engine(method: Method, boundary: BoundaryPolicy) -> Engine {
    Engine {
        method,
        boundary,
        domain: Domain::unit(),
    }
}

/// Free-fall derivative for a single [x, y, vx, vy] block
fn free_fall(g: f64) -> impl FnMut(f64, &[f64]) -> Vec<f64> {
    move |_t, s| vec![s[2], s[3], 0.0, -g]
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn integrator_rejects_ambiguous_step_spec() {
    let result = integrate(
        Method::Euler,
        free_fall(9.81),
        &[0.0, 0.0, 0.0, 0.0],
        (0.0, 1.0),
        Some(0.1),
        Some(10),
    );
    assert!(matches!(result, Err(IntegrateError::StepSpec)));

    let result = integrate(
        Method::Euler,
        free_fall(9.81),
        &[0.0, 0.0, 0.0, 0.0],
        (0.0, 1.0),
        None,
        None,
    );
    assert!(matches!(result, Err(IntegrateError::StepSpec)));
}

#[test]
fn integrator_zero_steps_returns_initial_state() {
    let state0 = [1.0, 2.0, 3.0, 4.0];
    let (times, states) = integrate(
        Method::Verlet,
        free_fall(9.81),
        &state0,
        (0.0, 1.0),
        None,
        Some(0),
    )
    .unwrap();

    assert_eq!(times, vec![0.0]);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0], state0.to_vec());
}

#[test]
fn integrator_rejects_partial_blocks_for_verlet() {
    let result = integrate(
        Method::Verlet,
        |_t, s: &[f64]| s.to_vec(),
        &[1.0, 2.0, 3.0],
        (0.0, 1.0),
        None,
        Some(1),
    );
    assert!(matches!(result, Err(IntegrateError::StateShape(3))));
}

#[test]
fn free_fall_matches_analytic_trajectory() {
    // y(t) = v0 t - g t^2 / 2 from rest height 0
    let g = 9.81;
    let v0 = 20.0;
    let t_end: f64 = 5.0;
    let state0 = [0.0, 0.0, 0.0, v0];
    let analytic = v0 * t_end - 0.5 * g * t_end * t_end;

    let (_, euler_states) = integrate(
        Method::Euler,
        free_fall(g),
        &state0,
        (0.0, t_end),
        None,
        Some(500),
    )
    .unwrap();
    let (_, verlet_states) = integrate(
        Method::Verlet,
        free_fall(g),
        &state0,
        (0.0, t_end),
        None,
        Some(500),
    )
    .unwrap();

    let euler_err = (euler_states.last().unwrap()[1] - analytic).abs();
    let verlet_err = (verlet_states.last().unwrap()[1] - analytic).abs();

    // First-order Euler drifts by roughly g*t*dt/2; Verlet reproduces
    // constant-acceleration motion to rounding error
    assert!(euler_err < 0.5, "Euler drifted too far: {euler_err}");
    assert!(verlet_err < 1e-9, "Verlet should be near-exact: {verlet_err}");
    assert!(
        verlet_err < euler_err,
        "Verlet ({verlet_err}) must beat Euler ({euler_err}) at equal step size"
    );
}

#[test]
fn step_size_spec_covers_the_span() {
    let (times, states) = integrate(
        Method::Euler,
        free_fall(0.0),
        &[0.0, 0.0, 1.0, 0.0],
        (0.0, 1.0),
        Some(0.01),
        None,
    )
    .unwrap();

    assert_eq!(times.len(), 101, "100 whole steps plus the initial sample");
    assert!((times.last().unwrap() - 1.0).abs() < 1e-9);
    assert!((states.last().unwrap()[0] - 1.0).abs() < 1e-9);
}

#[test]
fn integrator_preserves_block_order_across_bodies() {
    // Two blocks with distinct constant velocities; positions must
    // advance independently and stay in slot order
    let state0 = [0.0, 0.0, 1.0, 0.0, 10.0, 10.0, 0.0, -1.0];
    let (_, states) = integrate(
        Method::Verlet,
        |_t, s: &[f64]| {
            let mut d = vec![0.0; s.len()];
            for k in 0..s.len() / 4 {
                d[4 * k] = s[4 * k + 2];
                d[4 * k + 1] = s[4 * k + 3];
            }
            d
        },
        &state0,
        (0.0, 1.0),
        None,
        Some(10),
    )
    .unwrap();

    let last = states.last().unwrap();
    assert!((last[0] - 1.0).abs() < 1e-12);
    assert!((last[1] - 0.0).abs() < 1e-12);
    assert!((last[4] - 10.0).abs() < 1e-12);
    assert!((last[5] - 9.0).abs() < 1e-12);
}

#[test]
fn inverted_span_with_step_size_takes_no_steps() {
    let state0 = [0.0, 0.0, 1.0, 1.0];
    let (times, states) = integrate(
        Method::Euler,
        free_fall(9.81),
        &state0,
        (1.0, 0.0),
        Some(0.1),
        None,
    )
    .unwrap();
    assert_eq!(times, vec![1.0]);
    assert_eq!(states[0], state0.to_vec());
}

// ==================================================================================
// Vector math tests
// ==================================================================================

#[test]
fn rotation_matrices_agree_with_the_point_transform() {
    use orbsim::maths::vector::{rotation2, rotation3, transform_point};

    let angle = 0.7;
    let v = Vec2::new(0.3, -0.2);

    let rotated = rotation2(angle) * v;
    let transformed = transform_point(v, Vec2::zeros(), angle);
    assert!((rotated - transformed).norm() < 1e-12);

    // The homogeneous 3x3 form composes the same rotation
    let h = rotation3(angle) * nalgebra::Vector3::new(v.x, v.y, 1.0);
    assert!((Vec2::new(h.x, h.y) - rotated).norm() < 1e-12);

    // Composition by matrix multiply equals rotating by the sum
    let twice = rotation2(angle) * rotation2(angle);
    assert!((twice * v - rotation2(2.0 * angle) * v).norm() < 1e-12);
}

// ==================================================================================
// Collision detection tests
// ==================================================================================

#[test]
fn bare_circles_overlap_and_separate() {
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::zeros(), 1.0, 0.5),
        (Vec2::new(0.8, 0.0), Vec2::zeros(), 1.0, 0.5),
    );
    let contact = detect(&mut a, &mut b).expect("overlapping circles must collide");
    assert!((contact.normal - Vec2::new(1.0, 0.0)).norm() < 1e-12);
    assert!((contact.depth - 0.2).abs() < 1e-12);

    // Exactly touching circles do not collide (strict inequality)
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::zeros(), 1.0, 0.5),
        (Vec2::new(1.0, 0.0), Vec2::zeros(), 1.0, 0.5),
    );
    assert!(detect(&mut a, &mut b).is_none());
}

#[test]
fn touching_boxes_report_no_collision() {
    let square = |x: f64| {
        Body::new(Vec2::new(x, 0.0)).with_collider(Collider::AxisAlignedBox {
            width: 1.0,
            height: 1.0,
            offset: Vec2::zeros(),
        })
    };
    let mut a = square(0.0);
    let mut b = square(1.0); // edges meet exactly at x = 0.5
    assert!(
        detect(&mut a, &mut b).is_none(),
        "edge-to-edge touch must not collide"
    );

    let mut c = square(0.9);
    let contact = detect(&mut a, &mut c).expect("overlapping boxes must collide");
    assert!((contact.normal - Vec2::new(1.0, 0.0)).norm() < 1e-12);
    assert!((contact.depth - 0.1).abs() < 1e-12);
}

#[test]
fn touching_polygons_report_no_collision() {
    let square = |x: f64| {
        Body::new(Vec2::new(x, 0.0)).with_collider(Collider::Polygon {
            vertices: vec![
                Vec2::new(-0.5, 0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(-0.5, -0.5),
            ],
        })
    };
    let mut a = square(0.0);
    let mut b = square(1.0);
    assert!(
        detect(&mut a, &mut b).is_none(),
        "separating-axis touch must not collide"
    );

    let mut c = square(0.9);
    let contact = detect(&mut a, &mut c).expect("overlapping squares must collide");
    assert!((contact.depth - 0.1).abs() < 1e-9);
    // Normal points from A toward the other square
    assert!(contact.normal.x > 0.99);
}

#[test]
fn circle_against_static_line() {
    let mut circle = Body::new(Vec2::new(0.5, 0.05))
        .with_radius(0.1)
        .with_collider(Collider::Circle { radius: 0.1 });
    let mut line = Body::new(Vec2::new(0.0, 0.0))
        .with_static()
        .with_collider(Collider::LineSegment {
            end: Vec2::new(1.0, 0.0),
            offset: Vec2::zeros(),
        });

    let contact = detect(&mut circle, &mut line).expect("circle resting on the line");
    assert!((contact.normal - Vec2::new(0.0, -1.0)).norm() < 1e-12);
    assert!((contact.depth - 0.05).abs() < 1e-12);

    // Beyond the segment end the clamped closest point is the endpoint
    let mut far = Body::new(Vec2::new(1.5, 0.05))
        .with_radius(0.1)
        .with_collider(Collider::Circle { radius: 0.1 });
    assert!(detect(&mut far, &mut line).is_none());
}

#[test]
fn box_against_circle_narrow_phase() {
    let mut boxy = Body::new(Vec2::zeros()).with_collider(Collider::AxisAlignedBox {
        width: 1.0,
        height: 1.0,
        offset: Vec2::zeros(),
    });
    let mut circle = Body::new(Vec2::new(0.55, 0.0))
        .with_radius(0.1)
        .with_collider(Collider::Circle { radius: 0.1 });

    let contact = detect(&mut boxy, &mut circle).expect("circle leaning on the box edge");
    // From the box (A) toward the circle (B)
    assert!((contact.normal - Vec2::new(1.0, 0.0)).norm() < 1e-12);
    assert!((contact.depth - 0.05).abs() < 1e-12);
}

#[test]
fn crossing_segments_collide_parallel_ones_do_not() {
    let segment = |pos: Vec2, end: Vec2| {
        Body::new(pos)
            .with_static()
            .with_collider(Collider::LineSegment {
                end,
                offset: Vec2::zeros(),
            })
    };
    let mut a = segment(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
    let mut b = segment(Vec2::new(0.0, 1.0), Vec2::new(1.0, -1.0));
    let contact = detect(&mut a, &mut b).expect("diagonals must cross");
    assert_eq!(contact.depth, 0.0);

    let mut c = segment(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
    let mut d = segment(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
    assert!(detect(&mut c, &mut d).is_none(), "parallel segments never cross");
}

#[test]
fn polygon_transform_cache_follows_moves_and_rotation() {
    let mut body = Body::new(Vec2::new(1.0, 0.0)).with_collider(Collider::Polygon {
        vertices: vec![
            Vec2::new(-0.5, 0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(-0.5, -0.5),
        ],
    });

    let first = body.transformed_vertices()[0];
    assert!((first - Vec2::new(0.5, 0.5)).norm() < 1e-12);

    // Quarter turn: local (-0.5, 0.5) lands at (-0.5, -0.5) + position
    body.rotate(std::f64::consts::FRAC_PI_2);
    let rotated = body.transformed_vertices()[0];
    assert!((rotated - Vec2::new(0.5, -0.5)).norm() < 1e-12);

    body.translate(Vec2::new(1.0, 1.0));
    let moved = body.transformed_vertices()[0];
    assert!((moved - Vec2::new(1.5, 0.5)).norm() < 1e-12);
}

// ==================================================================================
// Collision resolution tests
// ==================================================================================

#[test]
fn resolution_conserves_momentum() {
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 2.0, 0.5),
        (Vec2::new(0.8, 0.0), Vec2::new(-1.0, 0.0), 3.0, 0.5),
    );
    let before = a.velocity * a.mass + b.velocity * b.mass;

    let contact = detect(&mut a, &mut b).unwrap();
    resolve_dynamic(&mut a, &mut b, &contact);

    let after = a.velocity * a.mass + b.velocity * b.mass;
    assert!(
        (before - after).norm() < 1e-12,
        "momentum changed: {before:?} -> {after:?}"
    );
}

#[test]
fn equal_masses_exchange_normal_velocities() {
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0, 0.5),
        (Vec2::new(0.8, 0.0), Vec2::new(-1.0, 0.0), 1.0, 0.5),
    );
    let contact = detect(&mut a, &mut b).unwrap();
    resolve_dynamic(&mut a, &mut b, &contact);

    assert!((a.velocity - Vec2::new(-1.0, 0.0)).norm() < 1e-12);
    assert!((b.velocity - Vec2::new(1.0, 0.0)).norm() < 1e-12);
}

#[test]
fn separating_pairs_are_left_alone() {
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0, 0.5),
        (Vec2::new(0.8, 0.0), Vec2::new(-1.0, 0.0), 1.0, 0.5),
    );
    let contact = Contact {
        normal: Vec2::new(1.0, 0.0),
        depth: 0.2,
    };
    resolve_dynamic(&mut a, &mut b, &contact);

    let (va, vb) = (a.velocity, b.velocity);
    let (pa, pb) = (a.position(), b.position());

    // Second resolution on the now-separating pair must be a no-op
    resolve_dynamic(&mut a, &mut b, &contact);
    assert_eq!(a.velocity, va);
    assert_eq!(b.velocity, vb);
    assert_eq!(a.position(), pa);
    assert_eq!(b.position(), pb);
}

#[test]
fn unequal_masses_split_positional_correction() {
    let (mut a, mut b) = two_circles(
        (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 3.0, 0.5),
        (Vec2::new(0.8, 0.0), Vec2::zeros(), 1.0, 0.5),
    );
    let contact = detect(&mut a, &mut b).unwrap();
    let depth = contact.depth;
    resolve_dynamic(&mut a, &mut b, &contact);

    // The light body moves three times as far as the heavy one
    assert!((a.position().x - (-depth * 0.25)).abs() < 1e-12);
    assert!((b.position().x - (0.8 + depth * 0.75)).abs() < 1e-12);
}

#[test]
fn static_partner_reflects_the_dynamic_body() {
    let mut ball = Body::new(Vec2::new(0.5, 0.05))
        .with_velocity(Vec2::new(0.3, -1.0))
        .with_radius(0.1)
        .with_collider(Collider::Circle { radius: 0.1 });
    let mut floor = Body::new(Vec2::zeros())
        .with_static()
        .with_collider(Collider::LineSegment {
            end: Vec2::new(1.0, 0.0),
            offset: Vec2::zeros(),
        });

    let contact = detect(&mut ball, &mut floor).unwrap();
    resolve_static(&mut ball, &floor, &contact);

    // Normal component reflects, tangential survives, overlap is gone
    assert!((ball.velocity.y - 1.0).abs() < 1e-12);
    assert!((ball.velocity.x - 0.3).abs() < 1e-12);
    assert!(ball.position().y >= 0.1 - 1e-12);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let mut sys = System::new();
    sys.add_dynamic(Body::new(Vec2::new(-0.5, 0.0)).with_mass(2.0).with_radius(0.0));
    sys.add_dynamic(Body::new(Vec2::new(0.5, 0.0)).with_mass(3.0).with_radius(0.0));

    let gravity = PairwiseGravity {
        g: 0.1,
        min_separation: 1e-6,
        cutoff_radius: f64::INFINITY,
    };
    let mut acc = vec![Vec2::zeros(); sys.dynamics.slot_count()];
    gravity.acceleration(sys.t, &sys, &mut acc);

    let net = acc[0] * 2.0 + acc[1] * 3.0;
    assert!(net.norm() < 1e-12, "net momentum flux not zero: {net:?}");
    assert!(acc[0].x > 0.0, "left body must be pulled right");
}

#[test]
fn gravity_inverse_square_law() {
    let accel_at = |dist: f64| {
        let mut sys = System::new();
        sys.add_dynamic(Body::new(Vec2::zeros()).with_mass(1.0).with_radius(0.0));
        sys.add_dynamic(Body::new(Vec2::new(dist, 0.0)).with_mass(1.0).with_radius(0.0));
        let gravity = PairwiseGravity {
            g: 1.0,
            min_separation: 1e-6,
            cutoff_radius: f64::INFINITY,
        };
        let mut acc = vec![Vec2::zeros(); sys.dynamics.slot_count()];
        gravity.acceleration(0.0, &sys, &mut acc);
        acc[0].norm()
    };

    let ratio = accel_at(1.0) / accel_at(2.0);
    assert!((ratio - 4.0).abs() < 1e-9, "expected ~4x, got {ratio}");
}

#[test]
fn gravity_gates_skip_near_and_far_pairs() {
    let accel_with = |dist: f64, min_sep: f64, cutoff: f64| {
        let mut sys = System::new();
        sys.add_dynamic(Body::new(Vec2::zeros()).with_mass(1.0).with_radius(0.0));
        sys.add_dynamic(Body::new(Vec2::new(dist, 0.0)).with_mass(1.0).with_radius(0.0));
        let gravity = PairwiseGravity {
            g: 1.0,
            min_separation: min_sep,
            cutoff_radius: cutoff,
        };
        let mut acc = vec![Vec2::zeros(); sys.dynamics.slot_count()];
        gravity.acceleration(0.0, &sys, &mut acc);
        acc[0].norm()
    };

    // Closer than the near gate: no force instead of a singularity
    assert_eq!(accel_with(1e-6, 1e-4, f64::INFINITY), 0.0);
    // Beyond the cutoff: pair skipped to bound cost
    assert_eq!(accel_with(0.5, 1e-4, 0.4), 0.0);
    // In between: finite pull
    assert!(accel_with(0.5, 1e-4, 1.0) > 0.0);
}

// ==================================================================================
// System step tests
// ==================================================================================

#[test]
fn reflect_boundary_turns_the_body_around() {
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(1.0 + 1e-3, 0.5))
            .with_velocity(Vec2::new(0.5, 0.0))
            .with_mass(1.0)
            .with_radius(0.01),
    );
    let forces = no_field_forces();
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Reflect);
    let params = Parameters::default();

    update(&mut sys, &forces, &engine, &params, 0.01);

    let (_, body) = sys.dynamics.iter().next().unwrap();
    assert!(body.velocity.x < 0.0, "velocity must have reflected");
    let x = body.position().x;
    assert!((0.0..=1.0).contains(&x), "position must be clamped: {x}");
}

#[test]
fn wrap_boundary_reenters_from_the_opposite_edge() {
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(0.95, 0.5))
            .with_velocity(Vec2::new(0.2, 0.0))
            .with_mass(1.0)
            .with_radius(0.01),
    );
    let forces = no_field_forces();
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Wrap);
    let params = Parameters::default();

    update(&mut sys, &forces, &engine, &params, 0.5);

    let (_, body) = sys.dynamics.iter().next().unwrap();
    assert!((body.position().x - 0.05).abs() < 1e-9);
    assert!(
        (body.velocity.x - 0.2).abs() < 1e-12,
        "wrap must not touch velocity"
    );
}

#[test]
fn force_free_drift_matches_hand_calculation() {
    // Circle A (mass 10, radius 0.1) drifting upward at 0.005 and a
    // far-away light circle B; zero gravity, 100 Verlet steps of 0.05
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(0.0, 0.0))
            .with_velocity(Vec2::new(0.0, 0.005))
            .with_mass(10.0)
            .with_radius(0.1),
    );
    sys.add_dynamic(
        Body::new(Vec2::new(1.0, 0.0))
            .with_mass(1.0)
            .with_radius(0.02),
    );
    let forces = no_field_forces();
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Reflect);
    let params = Parameters::default();

    for _ in 0..100 {
        update(&mut sys, &forces, &engine, &params, 0.05);
    }

    let mut bodies = sys.dynamics.iter();
    let (_, a) = bodies.next().unwrap();
    let (_, b) = bodies.next().unwrap();

    assert!(
        (a.position().y - 0.025).abs() < 1e-9,
        "A should have drifted to y = 0.025, got {}",
        a.position().y
    );
    assert!((a.position().x - 0.0).abs() < 1e-12);
    assert!(b.velocity.norm() < 1e-12, "B must stay at rest");
    assert!((sys.t - 5.0).abs() < 1e-9);
}

#[test]
fn velocity_clamp_and_damping_apply_after_integration() {
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(0.5, 0.5))
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_mass(1.0)
            .with_radius(0.01),
    );
    let forces = no_field_forces();
    let engine = unit_engine(Method::Euler, BoundaryPolicy::Wrap);
    let params = Parameters {
        max_velocity: 1.0,
        velocity_damping: 0.5,
        ..Parameters::default()
    };

    update(&mut sys, &forces, &engine, &params, 0.001);

    let (_, body) = sys.dynamics.iter().next().unwrap();
    assert!((body.velocity.x - 0.5).abs() < 1e-12);
}

#[test]
fn applied_forces_accelerate_through_the_step() {
    let mut sys = System::new();
    let id = sys.add_dynamic(
        Body::new(Vec2::new(0.5, 0.5))
            .with_mass(2.0)
            .with_radius(0.01),
    );
    sys.dynamics
        .get_mut(id)
        .unwrap()
        .apply_force(Vec2::new(2.0, 0.0)); // a = F/m = 1

    let forces = no_field_forces();
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Wrap);
    let params = Parameters::default();

    update(&mut sys, &forces, &engine, &params, 0.1);

    let body = sys.dynamics.get(id).unwrap();
    assert!((body.velocity.x - 0.1).abs() < 1e-9, "v = a*dt after one tick");
    // The accumulator is transient and must be cleared by the step
    assert_eq!(body.acceleration(), Vec2::zeros());
}

#[test]
fn uniform_gravity_accelerates_every_body() {
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(0.5, 0.9))
            .with_mass(1.0)
            .with_radius(0.01),
    );
    let forces = AccelSet::new().with(BodyAccumulators).with(UniformGravity {
        accel: Vec2::new(0.0, -1.0),
    });
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Reflect);
    let params = Parameters::default();

    update(&mut sys, &forces, &engine, &params, 0.1);

    let (_, body) = sys.dynamics.iter().next().unwrap();
    // Verlet reproduces constant-field free fall exactly
    assert!((body.velocity.y + 0.1).abs() < 1e-12);
    assert!((body.position().y - (0.9 - 0.005)).abs() < 1e-12);
}

#[test]
fn dynamic_bodies_bounce_off_static_geometry_in_a_step() {
    let mut sys = System::new();
    sys.add_dynamic(
        Body::new(Vec2::new(0.5, 0.08))
            .with_velocity(Vec2::new(0.0, -0.5))
            .with_mass(1.0)
            .with_radius(0.1)
            .with_collider(Collider::Circle { radius: 0.1 }),
    );
    sys.add_static(Body::new(Vec2::zeros()).with_collider(Collider::LineSegment {
        end: Vec2::new(1.0, 0.0),
        offset: Vec2::zeros(),
    }));

    let forces = no_field_forces();
    let engine = unit_engine(Method::Verlet, BoundaryPolicy::Wrap);
    let params = Parameters::default();

    update(&mut sys, &forces, &engine, &params, 0.01);

    let (_, ball) = sys.dynamics.iter().next().unwrap();
    assert!(ball.velocity.y > 0.0, "ball must bounce back off the floor");
}

// ==================================================================================
// Arena tests
// ==================================================================================

#[test]
fn arena_handles_survive_removal() {
    let mut arena = BodyArena::new();
    let a = arena.insert(Body::new(Vec2::new(0.0, 0.0)));
    let b = arena.insert(Body::new(Vec2::new(1.0, 0.0)));
    let c = arena.insert(Body::new(Vec2::new(2.0, 0.0)));

    assert!(arena.remove(b).is_some());
    assert_eq!(arena.len(), 2);

    // Other handles stay valid, the removed one misses
    assert!(arena.contains(a));
    assert!(arena.get(c).is_some());
    assert!(arena.get(b).is_none());
    assert!(arena.remove(b).is_none(), "double remove must miss");

    // The freed slot is reused under a new generation; the stale
    // handle still misses
    let d = arena.insert(Body::new(Vec2::new(3.0, 0.0)));
    assert_eq!(d.index(), b.index());
    assert!(arena.get(b).is_none());
    assert!((arena.get(d).unwrap().position().x - 3.0).abs() < 1e-12);
}

#[test]
fn system_remove_goes_through_the_dynamic_arena() {
    let mut sys = System::new();
    let id = sys.add_dynamic(Body::new(Vec2::zeros()));
    let wall = sys.add_static(Body::new(Vec2::zeros()));

    assert_eq!(sys.dynamics.len(), 1);
    assert!(sys.remove(id).is_some());
    assert!(sys.remove(id).is_none(), "stale handle must miss");
    assert!(
        sys.statics.get(wall).unwrap().is_static,
        "add_static force-flags the body"
    );
}

#[test]
fn arena_pair_access_is_order_preserving() {
    let mut arena = BodyArena::new();
    let a = arena.insert(Body::new(Vec2::new(0.0, 0.0)));
    let b = arena.insert(Body::new(Vec2::new(1.0, 0.0)));

    let (first, second) = arena
        .pair_mut(a.index() as u32, b.index() as u32)
        .unwrap();
    assert!((first.position().x - 0.0).abs() < 1e-12);
    assert!((second.position().x - 1.0).abs() < 1e-12);

    assert!(arena.pair_mut(a.index() as u32, a.index() as u32).is_none());
}

// ==================================================================================
// Scenario / configuration tests
// ==================================================================================

const SCENARIO_YAML: &str = r#"
engine:
  integrator: "verlet"
  boundary: "reflect"

parameters:
  dt: 0.005
  t_end: 1.0
  n_substeps: 4
  g: 0.0
  max_velocity: 10.0

bodies:
  - x: [ 0.2, 0.5 ]
    v: [ 0.0, 0.1 ]
    m: 1.0
    radius: 0.02
    collider: { shape: "circle", radius: 0.02 }
  - x: [ 0.5, 0.0 ]
    m: 1.0
    is_static: true
    collider: { shape: "line", end: [ 0.5, 0.0 ] }
"#;

#[test]
fn scenario_builds_from_yaml() {
    let cfg: ScenarioConfig = serde_yaml::from_str(SCENARIO_YAML).unwrap();
    let scenario = Scenario::build(cfg).unwrap();

    assert_eq!(scenario.system.dynamics.len(), 1);
    assert_eq!(scenario.system.statics.len(), 1);
    assert_eq!(scenario.engine.method, Method::Verlet);
    assert_eq!(scenario.engine.boundary, BoundaryPolicy::Reflect);
    assert_eq!(scenario.parameters.n_substeps, 4);
    // Unset optionals fall back to the documented defaults
    assert_eq!(scenario.parameters.velocity_damping, 1.0);
    assert!(scenario.parameters.cutoff_radius.is_infinite());

    let (_, body) = scenario.system.dynamics.iter().next().unwrap();
    assert!((body.position() - Vec2::new(0.2, 0.5)).norm() < 1e-12);
    assert!((body.velocity - Vec2::new(0.0, 0.1)).norm() < 1e-12);
}

#[test]
fn scenario_ticks_like_the_driver_would() {
    let cfg: ScenarioConfig = serde_yaml::from_str(SCENARIO_YAML).unwrap();
    let mut scenario = Scenario::build(cfg).unwrap();
    let dt = scenario.parameters.dt;

    for _ in 0..10 {
        scenario.update(dt);
    }
    assert!((scenario.system.t - 10.0 * dt).abs() < 1e-12);

    let (_, body) = scenario.system.dynamics.iter().next().unwrap();
    assert!((body.position().y - (0.5 + 10.0 * dt * 0.1)).abs() < 1e-9);
}

#[test]
fn construction_rejects_invalid_bodies() {
    let with_bodies = |bodies: &str| -> Result<Scenario, orbsim::ConfigError> {
        let yaml = format!(
            "engine:\n  integrator: \"euler\"\n  boundary: \"wrap\"\nparameters:\n  dt: 0.01\n  t_end: 1.0\nbodies:\n{bodies}"
        );
        let cfg: ScenarioConfig = serde_yaml::from_str(&yaml).unwrap();
        Scenario::build(cfg)
    };

    // Dynamic body with non-positive mass
    assert!(with_bodies("  - x: [0.0, 0.0]\n    m: 0.0\n").is_err());
    // Negative radius
    assert!(with_bodies("  - x: [0.0, 0.0]\n    m: 1.0\n    radius: -0.1\n").is_err());
    // Circle collider disagreeing with the body radius
    assert!(with_bodies(
        "  - x: [0.0, 0.0]\n    m: 1.0\n    radius: 0.1\n    collider: { shape: \"circle\", radius: 0.2 }\n"
    )
    .is_err());
    // Position with the wrong arity
    assert!(with_bodies("  - x: [0.0]\n    m: 1.0\n").is_err());
    // A valid body for contrast
    assert!(with_bodies("  - x: [0.5, 0.5]\n    m: 1.0\n    radius: 0.1\n").is_ok());
}

#[test]
fn construction_rejects_bad_parameters() {
    let build = |params: &str| -> Result<Scenario, orbsim::ConfigError> {
        let yaml = format!(
            "engine:\n  integrator: \"euler\"\n  boundary: \"wrap\"\nparameters:\n  dt: 0.01\n  t_end: 1.0\n{params}bodies: []\n"
        );
        let cfg: ScenarioConfig = serde_yaml::from_str(&yaml).unwrap();
        Scenario::build(cfg)
    };

    assert!(build("  n_substeps: 0\n").is_err());
    assert!(build("  velocity_damping: 0.0\n").is_err());
    assert!(build("  velocity_damping: 1.5\n").is_err());
    assert!(build("").is_ok());
}
