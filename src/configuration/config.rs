//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of
//! a simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator, boundary policy, domain
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"    # or "euler"
//!   boundary: "reflect"     # or "wrap"
//!   domain:                 # optional; defaults to the unit square
//!     x_min: 0.0
//!     x_max: 1.0
//!     y_min: 0.0
//!     y_max: 1.0
//!
//! parameters:
//!   dt: 0.005               # step size per tick
//!   t_end: 10.0             # headless run length
//!   n_substeps: 4           # integrator sub-steps per tick
//!   g: 1.0                  # gravitational constant (0 disables)
//!   min_separation: 1.0e-4  # pairwise gravity gate, near side
//!   cutoff_radius: 0.5      # pairwise gravity gate, far side
//!   max_acceleration: 999.0 # per-component clamp
//!   max_velocity: 999.0     # per-component clamp
//!   velocity_damping: 0.9997
//!
//! bodies:
//!   - x: [ 0.2, 0.5 ]
//!     v: [ 0.0, 0.1 ]
//!     m: 1.0
//!     radius: 0.02
//!     collider: { shape: "circle", radius: 0.02 }
//!   - x: [ 0.5, 0.0 ]
//!     m: 1.0
//!     is_static: true
//!     collider: { shape: "line", end: [ 0.5, 0.0 ] }
//! ```
//!
//! The engine maps this configuration into its runtime scenario
//! representation and validates it once at construction; nothing is
//! re-checked per step.

use serde::Deserialize;
use thiserror::Error;

/// Which integrator method advances the system
/// `integrator: "euler"` or `integrator: "verlet"`
#[derive(Deserialize, Debug, Clone)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // First-order explicit Euler, one derivative eval per step
    Euler,

    #[serde(rename = "verlet")] // Velocity Verlet, symmetric, preferred when energy drift matters
    Verlet,
}

/// Boundary policy applied when a body leaves the domain
#[derive(Deserialize, Debug, Clone)]
pub enum BoundaryConfig {
    #[serde(rename = "reflect")] // negate the offending velocity component, clamp position
    Reflect,

    #[serde(rename = "wrap")] // toroidal re-entry from the opposite edge
    Wrap,
}

/// Rectangular simulation domain; defaults to the unit square
#[derive(Deserialize, Debug, Clone)]
pub struct DomainConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// High-level engine configuration
#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // time integrator used for advancing the system state
    pub boundary: BoundaryConfig,     // what happens at the domain edge
    pub domain: Option<DomainConfig>, // spatial domain; unit square when omitted
}

/// Global numerical and physical parameters for a scenario
/// Omitted optionals fall back to the documented defaults
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,                         // step size per tick
    pub t_end: f64,                      // headless run length
    pub n_substeps: Option<u32>,         // integrator sub-steps per tick (default 1)
    pub g: Option<f64>,                  // gravitational constant (default 1.0, 0 disables)
    pub min_separation: Option<f64>,     // pairwise gravity near gate (default 1e-4)
    pub cutoff_radius: Option<f64>,      // pairwise gravity far gate (default unbounded)
    pub max_acceleration: Option<f64>,   // per-component clamp (default unbounded)
    pub max_velocity: Option<f64>,       // per-component clamp (default unbounded)
    pub velocity_damping: Option<f64>,   // per-step factor (default 1.0, no damping)
    pub uniform_gravity: Option<[f64; 2]>, // constant field, e.g. [0.0, -9.81]
}

/// Collision shape attached to a body
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "shape")]
pub enum ColliderConfig {
    #[serde(rename = "circle")]
    Circle { radius: f64 },

    #[serde(rename = "box")]
    Box {
        width: f64,
        height: f64,
        #[serde(default)]
        offset: [f64; 2],
    },

    #[serde(rename = "line")]
    Line {
        end: [f64; 2],
        #[serde(default)]
        offset: [f64; 2],
    },

    #[serde(rename = "polygon")]
    Polygon { vertices: Vec<[f64; 2]> },
}

fn default_true() -> bool {
    true
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position, exactly 2 components
    #[serde(default)]
    pub v: Vec<f64>, // initial velocity, 2 components or omitted for rest
    pub m: f64, // mass; must be > 0 for dynamic bodies
    pub radius: Option<f64>, // body radius (default 1.0)
    #[serde(default)]
    pub is_static: bool, // immovable collision geometry
    #[serde(default = "default_true")]
    pub can_collide: bool, // opt-out of the collision pass
    pub collider: Option<ColliderConfig>, // at most one shape
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,         // integrator, boundary, domain
    pub parameters: ParametersConfig, // global numerical and physical parameters
    pub bodies: Vec<BodyConfig>,      // initial state of the system
}

/// Construction-time validation failures
///
/// These are checked exactly once, when a scenario is built; the step
/// loop never re-validates
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("body {index}: position and velocity must have exactly 2 components")]
    BadVector { index: usize },

    #[error("body {index}: dynamic bodies need mass > 0 (got {mass})")]
    NonPositiveMass { index: usize, mass: f64 },

    #[error("body {index}: radius must be >= 0 (got {radius})")]
    NegativeRadius { index: usize, radius: f64 },

    #[error(
        "body {index}: circle collider radius {collider} does not match body radius {body}"
    )]
    RadiusMismatch {
        index: usize,
        collider: f64,
        body: f64,
    },

    #[error("body {index}: polygon colliders need at least 3 vertices")]
    DegeneratePolygon { index: usize },

    #[error("n_substeps must be >= 1")]
    ZeroSubsteps,

    #[error("velocity_damping must be in (0, 1] (got {0})")]
    BadDamping(f64),

    #[error("domain is inverted: min bounds must lie below max bounds")]
    InvalidDomain,
}
