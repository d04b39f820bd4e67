//! One simulation step: forces -> integration -> boundary -> collisions
//!
//! The external driver calls [`update`] once per tick with its own
//! `dt`; the whole step runs to completion before returning. State is
//! flattened as `[x, y, vx, vy]` per dynamic body in ascending slot
//! order, and comes back in the same order.
//!
//! The derivative handed to the integrator scatters the provisional
//! state into the bodies and re-runs the force set, so position-
//! dependent forces (pairwise gravity) are evaluated where the
//! integrator asks, not just at the step start.

use crate::collision::detect::detect;
use crate::collision::resolve;
use crate::maths::vector::Vec2;

use super::engine::{BoundaryPolicy, Engine};
use super::forces::AccelSet;
use super::integrator;
use super::params::Parameters;
use super::states::{System, MASS_FLOOR};

/// Advance the system by one tick of size `dt`
///
/// `dt` is subdivided into `params.n_substeps` equal integrator steps.
/// Mass positivity is not validated here; a non-positive mass on a
/// dynamic body yields non-finite velocities rather than an error
pub fn update(
    sys: &mut System,
    forces: &AccelSet,
    engine: &Engine,
    params: &Parameters,
    dt: f64,
) {
    integrate_bodies(sys, forces, engine, params, dt);
    apply_boundary(sys, engine);
    collision_pass(sys);
    sys.t += dt;
}

/// Integrate all dynamic bodies and write the final state back
fn integrate_bodies(
    sys: &mut System,
    forces: &AccelSet,
    engine: &Engine,
    params: &Parameters,
    dt: f64,
) {
    // Flatten live, non-static bodies in ascending slot order
    let mut blocks: Vec<u32> = Vec::new();
    let mut state0: Vec<f64> = Vec::new();
    for (id, body) in sys.dynamics.iter() {
        if body.is_static {
            continue;
        }
        blocks.push(id.index() as u32);
        let p = body.position();
        let v = body.velocity;
        state0.extend_from_slice(&[p.x, p.y, v.x, v.y]);
    }
    if blocks.is_empty() {
        return;
    }

    let mut accel = vec![Vec2::zeros(); sys.dynamics.slot_count()];
    let t0 = sys.t;
    let max_a = params.max_acceleration;

    let substeps = params.n_substeps.max(1) as usize;
    let sub_dt = dt / substeps as f64;

    let (_times, states) = {
        let dydt = |t: f64, state: &[f64]| -> Vec<f64> {
            // Scatter the integrator's state into the bodies so the
            // force models see the positions being asked about
            for (k, &slot) in blocks.iter().enumerate() {
                let base = 4 * k;
                if let Some(body) = sys.dynamics.get_index_mut(slot) {
                    body.move_to(Vec2::new(state[base], state[base + 1]));
                    body.velocity = Vec2::new(state[base + 2], state[base + 3]);
                }
            }

            forces.accumulate(t, sys, &mut accel);

            let mut out = vec![0.0; state.len()];
            for (k, &slot) in blocks.iter().enumerate() {
                let base = 4 * k;
                let a = accel[slot as usize];
                out[base] = state[base + 2];
                out[base + 1] = state[base + 3];
                out[base + 2] = a.x.clamp(-max_a, max_a);
                out[base + 3] = a.y.clamp(-max_a, max_a);
            }
            out
        };

        // The step spec is constructed here (substeps >= 1, block
        // state), so the integrate() configuration errors cannot occur
        integrator::run(engine.method, dydt, &state0, t0, sub_dt, substeps)
    };

    let Some(final_state) = states.last() else {
        return;
    };

    for (k, &slot) in blocks.iter().enumerate() {
        let base = 4 * k;
        if let Some(body) = sys.dynamics.get_index_mut(slot) {
            body.move_to(Vec2::new(final_state[base], final_state[base + 1]));

            let max_v = params.max_velocity;
            let vx = final_state[base + 2].clamp(-max_v, max_v);
            let vy = final_state[base + 3].clamp(-max_v, max_v);
            body.velocity = Vec2::new(vx, vy) * params.velocity_damping;

            body.clear_acceleration();
        }
    }
}

/// Apply the configured boundary policy to every dynamic body
fn apply_boundary(sys: &mut System, engine: &Engine) {
    let domain = engine.domain;
    for (_, body) in sys.dynamics.iter_mut() {
        if body.is_static {
            continue;
        }
        let mut p = body.position();
        let mut v = body.velocity;

        match engine.boundary {
            BoundaryPolicy::Reflect => {
                if p.x < domain.x_min {
                    p.x = domain.x_min;
                    if v.x < 0.0 {
                        v.x = -v.x;
                    }
                } else if p.x > domain.x_max {
                    p.x = domain.x_max;
                    if v.x > 0.0 {
                        v.x = -v.x;
                    }
                }
                if p.y < domain.y_min {
                    p.y = domain.y_min;
                    if v.y < 0.0 {
                        v.y = -v.y;
                    }
                } else if p.y > domain.y_max {
                    p.y = domain.y_max;
                    if v.y > 0.0 {
                        v.y = -v.y;
                    }
                }
            }
            BoundaryPolicy::Wrap => {
                if p.x < domain.x_min {
                    p.x += domain.width();
                } else if p.x > domain.x_max {
                    p.x -= domain.width();
                }
                if p.y < domain.y_min {
                    p.y += domain.height();
                } else if p.y > domain.y_max {
                    p.y -= domain.height();
                }
            }
        }

        body.move_to(p);
        body.velocity = v;
    }
}

/// All-pairs collision pass
///
/// Dynamic pairs are visited in ascending slot order `(i, j > i)`,
/// then each dynamic body against the static geometry in insertion
/// order. The visit order is part of the contract: it fixes the
/// tie-break when one body touches several others in the same step
fn collision_pass(sys: &mut System) {
    let collidable: Vec<u32> = sys
        .dynamics
        .iter()
        .filter(|(_, b)| b.can_collide && !b.is_static && b.mass >= MASS_FLOOR)
        .map(|(id, _)| id.index() as u32)
        .collect();

    for a_pos in 0..collidable.len() {
        for b_pos in (a_pos + 1)..collidable.len() {
            let Some((a, b)) = sys.dynamics.pair_mut(collidable[a_pos], collidable[b_pos])
            else {
                continue;
            };
            if let Some(contact) = detect(a, b) {
                resolve::resolve_dynamic(a, b, &contact);
            }
        }
    }

    let static_ids: Vec<u32> = sys
        .statics
        .iter()
        .filter(|(_, b)| b.can_collide)
        .map(|(id, _)| id.index() as u32)
        .collect();

    let System {
        dynamics, statics, ..
    } = sys;
    for &slot in &collidable {
        for &wall in &static_ids {
            let (Some(a), Some(b)) = (dynamics.get_index_mut(slot), statics.get_index_mut(wall))
            else {
                continue;
            };
            if let Some(contact) = detect(a, b) {
                resolve::resolve_static(a, b, &contact);
            }
        }
    }
}
