//! Fixed-step ODE integrators over flat state vectors
//!
//! Both integrators are stateless and generic over a derivative
//! function and a flattened state laid out as `[x, y, vx, vy]` blocks,
//! one per body, in system order. The derivative returns
//! `[vx, vy, ax, ay]` per block. Neither integrator assumes a block
//! count; Euler in fact works on any state length.

use thiserror::Error;

/// Which stepping scheme advances the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// First-order explicit Euler; cheap, drifts on oscillatory systems
    Euler,
    /// Velocity Verlet: two derivative evaluations per step, symmetric
    /// and time-reversible to first order in velocity. Preferred where
    /// energy drift matters (gravity wells, bouncing systems)
    Verlet,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrateError {
    /// Step resolution is ambiguous or absent; this is a programmer
    /// error and fails fast with no partial result
    #[error("exactly one of step_size or n_steps must be supplied")]
    StepSpec,
    /// Verlet needs whole `[x, y, vx, vy]` blocks
    #[error("state length {0} is not a multiple of 4")]
    StateShape(usize),
}

/// Advance `state0` from `t_span.0` to `t_span.1`
///
/// Exactly one of `step_size` or `n_steps` must be supplied. A step
/// count of zero returns the initial state with a single time sample.
/// An inverted span (`start > end`) is accepted and simply yields a
/// negative step; the caller owns that choice.
///
/// Returns the sampled times and the state after each step, with
/// `times[0] == t_span.0` and `states[0] == state0`
pub fn integrate<F>(
    method: Method,
    dydt: F,
    state0: &[f64],
    t_span: (f64, f64),
    step_size: Option<f64>,
    n_steps: Option<u32>,
) -> Result<(Vec<f64>, Vec<Vec<f64>>), IntegrateError>
where
    F: FnMut(f64, &[f64]) -> Vec<f64>,
{
    let (t_start, t_end) = t_span;

    let (dt, n) = match (step_size, n_steps) {
        (Some(_), Some(_)) | (None, None) => return Err(IntegrateError::StepSpec),
        (Some(h), None) => {
            // Cover the span with whole steps of size h; an inverted
            // span rounds to zero steps
            let n = ((t_end - t_start) / h).ceil().max(0.0) as usize;
            (h, n)
        }
        (None, Some(0)) => (0.0, 0),
        (None, Some(n)) => ((t_end - t_start) / f64::from(n), n as usize),
    };

    if method == Method::Verlet && state0.len() % 4 != 0 {
        return Err(IntegrateError::StateShape(state0.len()));
    }

    Ok(run(method, dydt, state0, t_start, dt, n))
}

/// The validated stepping loop
///
/// Split out so internal callers that construct the step spec
/// themselves (and therefore cannot hit the configuration errors) can
/// skip the `Result`
pub(crate) fn run<F>(
    method: Method,
    mut dydt: F,
    state0: &[f64],
    t_start: f64,
    dt: f64,
    n_steps: usize,
) -> (Vec<f64>, Vec<Vec<f64>>)
where
    F: FnMut(f64, &[f64]) -> Vec<f64>,
{
    let mut times = Vec::with_capacity(n_steps + 1);
    let mut states = Vec::with_capacity(n_steps + 1);
    times.push(t_start);
    states.push(state0.to_vec());

    let mut t = t_start;
    let mut state = state0.to_vec();

    for _ in 0..n_steps {
        state = match method {
            Method::Euler => euler_step(&mut dydt, t, &state, dt),
            Method::Verlet => verlet_step(&mut dydt, t, &state, dt),
        };
        t += dt;
        times.push(t);
        states.push(state.clone());
    }

    (times, states)
}

/// One explicit Euler step: `y' = y + dt * f(t, y)`
fn euler_step<F>(dydt: &mut F, t: f64, state: &[f64], dt: f64) -> Vec<f64>
where
    F: FnMut(f64, &[f64]) -> Vec<f64>,
{
    let deriv = dydt(t, state);
    state
        .iter()
        .zip(deriv.iter())
        .map(|(y, dy)| y + dt * dy)
        .collect()
}

/// One velocity-Verlet step over every `[x, y, vx, vy]` block
///
/// Positions advance with the acceleration evaluated at the current
/// state; the derivative is then re-evaluated at the provisional
/// positions (velocities unchanged) and the two accelerations are
/// averaged into the velocity update
fn verlet_step<F>(dydt: &mut F, t: f64, state: &[f64], dt: f64) -> Vec<f64>
where
    F: FnMut(f64, &[f64]) -> Vec<f64>,
{
    let half_dt2 = 0.5 * dt * dt;
    let deriv = dydt(t, state);

    // Provisional positions from a(t); velocities carried over
    let mut provisional = state.to_vec();
    for k in 0..state.len() / 4 {
        let base = 4 * k;
        provisional[base] = state[base] + state[base + 2] * dt + deriv[base + 2] * half_dt2;
        provisional[base + 1] = state[base + 1] + state[base + 3] * dt + deriv[base + 3] * half_dt2;
    }

    // a(t + dt) at the provisional positions
    let deriv_new = dydt(t, &provisional);

    let mut next = provisional;
    for k in 0..state.len() / 4 {
        let base = 4 * k;
        next[base + 2] = state[base + 2] + 0.5 * (deriv[base + 2] + deriv_new[base + 2]) * dt;
        next[base + 3] = state[base + 3] + 0.5 * (deriv[base + 3] + deriv_new[base + 3]) * dt;
    }
    next
}
