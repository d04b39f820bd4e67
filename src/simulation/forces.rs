//! Force / acceleration contributors
//!
//! Each term implements [`Acceleration`] and adds its contribution
//! into a per-slot acceleration buffer; [`AccelSet`] zeroes the buffer
//! and sums every registered term. Static bodies receive nothing.

use crate::maths::vector::Vec2;
use crate::simulation::states::{System, MASS_FLOOR};

/// Collection of acceleration terms (gravity, uniform fields, etc.)
/// Contributions are summed into a single acceleration per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations at time `t` for all dynamic bodies
    /// `out` is indexed by dynamic-arena slot index and fully zeroed
    /// before the terms run
    pub fn accumulate(&self, t: f64, sys: &System, out: &mut [Vec2]) {
        for a in out.iter_mut() {
            *a = Vec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources operating on a [`System`]
/// Implementations add their contribution into `out[slot]` per body
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &System, out: &mut [Vec2]);
}

/// Forwards each body's transient accumulator (filled by
/// [`crate::simulation::states::Body::apply_force`]) into the
/// derivative. The system zeroes the accumulators after the step
pub struct BodyAccumulators;

impl Acceleration for BodyAccumulators {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [Vec2]) {
        for (id, body) in sys.dynamics.iter() {
            if body.is_static {
                continue;
            }
            out[id.index()] += body.acceleration();
        }
    }
}

/// Constant acceleration field applied to every dynamic body
/// (e.g. `(0, -9.81)` for uniform downward gravity)
pub struct UniformGravity {
    pub accel: Vec2,
}

impl Acceleration for UniformGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [Vec2]) {
        for (id, body) in sys.dynamics.iter() {
            if body.is_static {
                continue;
            }
            out[id.index()] += self.accel;
        }
    }
}

/// Pairwise Newtonian attraction, `F = g * m_i * m_j / r^2` along the
/// connecting vector, accumulated into both bodies with opposite sign
///
/// Pairs separated by less than `min_separation` are skipped entirely
/// (singularity guard) and pairs beyond `cutoff_radius` are skipped to
/// bound cost. A partner below the mass floor exerts no pull but still
/// feels one
pub struct PairwiseGravity {
    pub g: f64,
    pub min_separation: f64,
    pub cutoff_radius: f64,
}

impl Acceleration for PairwiseGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [Vec2]) {
        // Snapshot of live bodies: (slot, position, mass)
        let bodies: Vec<(usize, Vec2, f64)> = sys
            .dynamics
            .iter()
            .filter(|(_, b)| !b.is_static)
            .map(|(id, b)| (id.index(), b.position(), b.mass))
            .collect();

        // Unordered pairs (i, j) with i < j in slot order
        for i in 0..bodies.len() {
            let (slot_i, xi, mi) = bodies[i];
            for &(slot_j, xj, mj) in bodies.iter().skip(i + 1) {
                let r = xj - xi;
                let r2 = r.norm_squared();
                let distance = r2.sqrt();
                if distance < self.min_separation || distance > self.cutoff_radius {
                    continue;
                }

                // a_i = g * m_j / r^2 toward j, and symmetrically for j
                let direction = r / distance;
                let coef = self.g / r2;
                if mj >= MASS_FLOOR {
                    out[slot_i] += direction * (coef * mj);
                }
                if mi >= MASS_FLOOR {
                    out[slot_j] -= direction * (coef * mi);
                }
            }
        }
    }
}
