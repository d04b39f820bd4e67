pub mod benchmark;
pub mod collision;
pub mod configuration;
pub mod maths;
pub mod simulation;

pub use maths::vector::Vec2;

pub use simulation::engine::{BoundaryPolicy, Domain, Engine};
pub use simulation::forces::{
    AccelSet, Acceleration, BodyAccumulators, PairwiseGravity, UniformGravity,
};
pub use simulation::integrator::{integrate, IntegrateError, Method};
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;
pub use simulation::states::{Body, BodyArena, BodyId, System, MASS_FLOOR};

pub use collision::collider::{Collider, Contact};
pub use collision::detect::detect;
pub use collision::resolve::{resolve_dynamic, resolve_static};

pub use configuration::config::{
    BodyConfig, BoundaryConfig, ColliderConfig, ConfigError, DomainConfig, EngineConfig,
    IntegratorConfig, ParametersConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_pairwise_gravity, bench_update};
