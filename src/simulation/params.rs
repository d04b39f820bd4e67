//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - step size, run length and integrator sub-stepping,
//! - gravitational constant and the pair gates that guard it,
//! - acceleration/velocity clamps and per-step damping

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64,              // step size per external tick
    pub t_end: f64,           // headless run length
    pub n_substeps: u32,      // integrator sub-steps per tick, >= 1
    pub g: f64,               // gravitational constant
    pub min_separation: f64,  // pairwise gravity skipped below this
    pub cutoff_radius: f64,   // pairwise gravity skipped beyond this
    pub max_acceleration: f64, // per-component clamp on accelerations
    pub max_velocity: f64,    // per-component clamp on velocities
    pub velocity_damping: f64, // per-step multiplicative factor, 1.0 = none
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 0.01,
            t_end: 10.0,
            n_substeps: 1,
            g: 1.0,
            min_separation: 1e-4,
            cutoff_radius: f64::INFINITY,
            max_acceleration: f64::INFINITY,
            max_velocity: f64::INFINITY,
            velocity_damping: 1.0,
        }
    }
}
