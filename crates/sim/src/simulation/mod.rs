//! Parameter store, solve cache, state projection and the reactive session.
//!
//! Re-exports
//!
//! The most commonly used types are re-exported here so consumers can import
//! them from `stemflow_sim::simulation`.
//!
//! - `Session`: the reactive controller owning one store, cache and projector.
//! - `SessionBuilder`: fluent builder over `EngineConfig` with validation.
//! - `ParameterStore`: bounded parameter values with no-op detection.
//! - `SolveCache`: single-entry trajectory cache keyed by parameter vector.
//! - `StateProjector`: time lookup and status classification.

pub mod builder;
pub mod cache;
pub mod configs;
pub mod parameters;
pub mod projector;
pub mod session;

pub use builder::SessionBuilder;
pub use cache::{CachedSolve, SolveCache};
pub use configs::{EngineConfig, DEFAULT_SEED};
pub use parameters::{
    default_parameter_specs, Adjustment, Direction, ParameterName, ParameterSpec, ParameterStore,
    ParameterVector, PARAMETER_COUNT,
};
pub use projector::{Band, DisplayConfig, MarkerScale, StateProjector, StatusLabel, StatusRules};
pub use session::{
    ChangeOutcome, ControlEvent, ControllerState, ParameterChange, ParameterOutputs, Session,
    TimeOutputs,
};
