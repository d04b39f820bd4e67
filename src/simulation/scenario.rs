//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime
//! bundle containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//! - active force set (`AccelSet`)
//!
//! All validation happens here, once; the step loop trusts the result.

use crate::collision::collider::Collider;
use crate::configuration::config::{
    BodyConfig, BoundaryConfig, ColliderConfig, ConfigError, IntegratorConfig, ScenarioConfig,
};
use crate::maths::vector::Vec2;
use crate::simulation::engine::{BoundaryPolicy, Domain, Engine};
use crate::simulation::forces::{AccelSet, BodyAccumulators, PairwiseGravity, UniformGravity};
use crate::simulation::integrator::Method;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, System};
use crate::simulation::system;

/// A fully-initialized simulation scenario
///
/// The main runtime bundle constructed from a [`ScenarioConfig`]: the
/// engine settings, parameters, current system state, and the set of
/// active force laws. The external driver ticks it via
/// [`Scenario::update`] and reads body state back for rendering
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: AccelSet,
}

impl Scenario {
    /// Validate `cfg` and assemble the runtime scenario
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            dt: p_cfg.dt,
            t_end: p_cfg.t_end,
            n_substeps: p_cfg.n_substeps.unwrap_or(1),
            g: p_cfg.g.unwrap_or(1.0),
            min_separation: p_cfg.min_separation.unwrap_or(1e-4),
            cutoff_radius: p_cfg.cutoff_radius.unwrap_or(f64::INFINITY),
            max_acceleration: p_cfg.max_acceleration.unwrap_or(f64::INFINITY),
            max_velocity: p_cfg.max_velocity.unwrap_or(f64::INFINITY),
            velocity_damping: p_cfg.velocity_damping.unwrap_or(1.0),
        };
        if parameters.n_substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if !(parameters.velocity_damping > 0.0 && parameters.velocity_damping <= 1.0) {
            return Err(ConfigError::BadDamping(parameters.velocity_damping));
        }

        let domain = match &cfg.engine.domain {
            Some(d) => {
                if d.x_min >= d.x_max || d.y_min >= d.y_max {
                    return Err(ConfigError::InvalidDomain);
                }
                Domain {
                    x_min: d.x_min,
                    x_max: d.x_max,
                    y_min: d.y_min,
                    y_max: d.y_max,
                }
            }
            None => Domain::unit(),
        };
        let engine = Engine {
            method: match cfg.engine.integrator {
                IntegratorConfig::Euler => Method::Euler,
                IntegratorConfig::Verlet => Method::Verlet,
            },
            boundary: match cfg.engine.boundary {
                BoundaryConfig::Reflect => BoundaryPolicy::Reflect,
                BoundaryConfig::Wrap => BoundaryPolicy::Wrap,
            },
            domain,
        };

        let mut system = System::new();
        for (index, bc) in cfg.bodies.iter().enumerate() {
            let body = build_body(index, bc)?;
            if bc.is_static {
                system.add_static(body);
            } else {
                system.add_dynamic(body);
            }
        }

        // Force set: per-body accumulators always run; the field terms
        // are registered only when the scenario asks for them
        let mut forces = AccelSet::new().with(BodyAccumulators);
        if parameters.g != 0.0 {
            forces = forces.with(PairwiseGravity {
                g: parameters.g,
                min_separation: parameters.min_separation,
                cutoff_radius: parameters.cutoff_radius,
            });
        }
        if let Some([ax, ay]) = p_cfg.uniform_gravity {
            forces = forces.with(UniformGravity {
                accel: Vec2::new(ax, ay),
            });
        }

        Ok(Self {
            engine,
            parameters,
            system,
            forces,
        })
    }

    /// Advance the simulation by one tick of size `dt`
    pub fn update(&mut self, dt: f64) {
        system::update(
            &mut self.system,
            &self.forces,
            &self.engine,
            &self.parameters,
            dt,
        );
    }
}

/// Map one `BodyConfig` into a runtime `Body`, validating as we go
fn build_body(index: usize, bc: &BodyConfig) -> Result<Body, ConfigError> {
    if bc.x.len() != 2 || !(bc.v.is_empty() || bc.v.len() == 2) {
        return Err(ConfigError::BadVector { index });
    }
    if !bc.is_static && bc.m <= 0.0 {
        return Err(ConfigError::NonPositiveMass {
            index,
            mass: bc.m,
        });
    }
    let radius = bc.radius.unwrap_or(1.0);
    if radius < 0.0 {
        return Err(ConfigError::NegativeRadius { index, radius });
    }

    let velocity = if bc.v.is_empty() {
        Vec2::zeros()
    } else {
        Vec2::new(bc.v[0], bc.v[1])
    };

    let mut body = Body::new(Vec2::new(bc.x[0], bc.x[1]))
        .with_velocity(velocity)
        .with_mass(bc.m)
        .with_radius(radius)
        .with_can_collide(bc.can_collide);

    if let Some(collider) = &bc.collider {
        let collider = match collider {
            ColliderConfig::Circle { radius: r } => {
                // The collider's radius is the authoritative one in
                // collision code; a mismatch would silently drift
                if (*r - radius).abs() > f64::EPSILON {
                    return Err(ConfigError::RadiusMismatch {
                        index,
                        collider: *r,
                        body: radius,
                    });
                }
                Collider::Circle { radius: *r }
            }
            ColliderConfig::Box {
                width,
                height,
                offset,
            } => Collider::AxisAlignedBox {
                width: *width,
                height: *height,
                offset: Vec2::new(offset[0], offset[1]),
            },
            ColliderConfig::Line { end, offset } => Collider::LineSegment {
                end: Vec2::new(end[0], end[1]),
                offset: Vec2::new(offset[0], offset[1]),
            },
            ColliderConfig::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ConfigError::DegeneratePolygon { index });
                }
                Collider::Polygon {
                    vertices: vertices.iter().map(|[x, y]| Vec2::new(*x, *y)).collect(),
                }
            }
        };
        body = body.with_collider(collider);
    }

    Ok(body)
}
