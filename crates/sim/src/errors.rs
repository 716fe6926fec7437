use thiserror::Error;

use crate::base::Compartment;

/// Error returned when the integrator cannot produce a sample at every grid
/// point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// A compartment became non-finite or exceeded the divergence limit.
    #[error("Solution diverged in the {compartment} compartment at t = {time}")]
    Diverged {
        /// Compartment that blew up
        compartment: Compartment,
        /// Simulated time of the failing sub-step
        time: f64,
    },

    /// The integrator returned fewer (or more) samples than the grid holds.
    #[error("Trajectory has {got} samples, expected {expected}")]
    Truncated {
        /// Number of grid points
        expected: usize,
        /// Number of samples produced
        got: usize,
    },
}

/// Errors raised while validating an engine configuration or building a
/// session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The time grid is empty or malformed.
    #[error("Invalid time grid: {0}")]
    InvalidGrid(String),

    /// A parameter specification violates its own bound or step.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter identifier
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A parameter is missing from, or repeated in, the parameter list.
    #[error("Parameter list must name every parameter exactly once: {0}")]
    ParameterSet(String),

    /// Any other out-of-range setting.
    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting {
        /// Configuration field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Failure reading or parsing a configuration file.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Load(format!("IO error: {e}"))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Load(format!("JSON error: {e}"))
    }
}

/// Top-level error type of the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A parameter name outside the fixed parameter set.
    #[error("Unknown parameter: '{0}'")]
    UnknownParameter(String),

    /// The solve for a changed parameter vector failed; the change was rolled back.
    #[error(transparent)]
    Solve(#[from] SolveError),

    /// A query time that is not a point of the time grid.
    #[error("Time {time} is not on the grid [{min}, {max}] with step {step}")]
    TimeOutOfGrid {
        /// Requested time
        time: f64,
        /// First grid point
        min: f64,
        /// Last grid point
        max: f64,
        /// Grid spacing
        step: f64,
    },

    /// The session could not be built from its configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A session lock was poisoned by a panicking thread.
    #[error("Session lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;
