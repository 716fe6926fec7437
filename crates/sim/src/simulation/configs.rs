//! Engine configuration.
//!
//! [`EngineConfig`] bundles everything a session needs and can be
//! deserialized from a JSON file to reproduce a setup exactly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::base::{CompartmentState, TimeGrid, COMPARTMENTS};
use crate::errors::ConfigError;
use crate::model::DEFAULT_NOISE;
use crate::simulation::{
    default_parameter_specs, DisplayConfig, ParameterSpec, ParameterStore, StatusRules,
};

/// Default seed of the stochastic integration.
pub const DEFAULT_SEED: u64 = 42;

fn default_substeps() -> usize {
    10
}

fn default_divergence_limit() -> f64 {
    1e12
}

/// Complete configuration of a simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sample times shared by every trajectory and query
    pub grid: TimeGrid,
    /// Population at the first grid time
    pub initial_state: CompartmentState,
    /// Additive noise magnitude per compartment
    pub noise: [f64; COMPARTMENTS],
    /// RNG seed used for every solve
    pub seed: u64,
    /// Integrator sub-steps per grid step
    #[serde(default = "default_substeps")]
    pub substeps: usize,
    /// Count above which a solve is declared divergent
    #[serde(default = "default_divergence_limit")]
    pub divergence_limit: f64,
    /// Starting value, floor and step of every parameter
    pub parameters: Vec<ParameterSpec>,
    /// Status classification rules
    #[serde(default)]
    pub status: StatusRules,
    /// Presentation settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: TimeGrid::default(),
            initial_state: CompartmentState::new(1000.0, 100.0, 100.0),
            noise: DEFAULT_NOISE,
            seed: DEFAULT_SEED,
            substeps: default_substeps(),
            divergence_limit: default_divergence_limit(),
            parameters: default_parameter_specs(),
            status: StatusRules::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check every setting. Sessions only accept validated configurations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        if !self.initial_state.is_valid() {
            return Err(ConfigError::InvalidSetting {
                field: "initial_state",
                reason: format!("counts must be finite and non-negative ({})", self.initial_state),
            });
        }
        if self.noise.iter().any(|n| !n.is_finite() || *n < 0.0) {
            return Err(ConfigError::InvalidSetting {
                field: "noise",
                reason: format!("magnitudes must be finite and non-negative, got {:?}", self.noise),
            });
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "substeps",
                reason: "at least one sub-step is required".into(),
            });
        }
        if self.divergence_limit.is_nan()
            || self.divergence_limit <= self.initial_state.max_count()
        {
            return Err(ConfigError::InvalidSetting {
                field: "divergence_limit",
                reason: format!(
                    "{} must exceed every initial count",
                    self.divergence_limit
                ),
            });
        }

        ParameterStore::from_specs(&self.parameters)?;
        self.status.validate()?;
        self.display.validate()
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file written by [`EngineConfig::to_json_string`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Pretty-printed JSON representation.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
