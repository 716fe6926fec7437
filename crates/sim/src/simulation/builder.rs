//! Builder pattern for creating sessions.
//!
//! Provides a fluent API over [`EngineConfig`] with the reference scenario as
//! the starting point and validation on build.

use crate::base::{CompartmentState, TimeGrid, COMPARTMENTS};
use crate::errors::{ConfigError, EngineResult};
use crate::simulation::{
    EngineConfig, MarkerScale, ParameterName, ParameterSpec, Session, StatusRules,
};

/// Builder for constructing [`Session`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use stemflow_sim::simulation::{ParameterName, SessionBuilder};
///
/// let session = SessionBuilder::new()
///     .time_grid(0.0, 20.0, 0.1)
///     .seed(7)
///     .parameter(ParameterName::D3, 0.6)
///     .build()
///     .unwrap();
///
/// assert_eq!(session.grid().len(), 201);
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: EngineConfig,
    grid: Option<(f64, f64, f64)>,
    overrides: Vec<(ParameterName, SpecField, f64)>,
}

#[derive(Debug, Clone, Copy)]
enum SpecField {
    Value,
    LowerBound,
    Increment,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            grid: None,
            overrides: Vec::new(),
        }
    }

    /// Set the time grid (validated on build).
    pub fn time_grid(mut self, time_min: f64, time_max: f64, time_step: f64) -> Self {
        self.grid = Some((time_min, time_max, time_step));
        self
    }

    /// Set the population at the first grid time.
    pub fn initial_state(mut self, stem: f64, progenitor: f64, differentiated: f64) -> Self {
        self.config.initial_state = CompartmentState::new(stem, progenitor, differentiated);
        self
    }

    /// Set the additive noise magnitude per compartment.
    pub fn noise(mut self, noise: [f64; COMPARTMENTS]) -> Self {
        self.config.noise = noise;
        self
    }

    /// Set the integration seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the integrator sub-steps per grid step.
    pub fn substeps(mut self, substeps: usize) -> Self {
        self.config.substeps = substeps;
        self
    }

    /// Set the count above which a solve fails.
    pub fn divergence_limit(mut self, limit: f64) -> Self {
        self.config.divergence_limit = limit;
        self
    }

    /// Set the starting value of a parameter.
    pub fn parameter(mut self, name: ParameterName, value: f64) -> Self {
        self.overrides.push((name, SpecField::Value, value));
        self
    }

    /// Set the floor of a parameter.
    pub fn lower_bound(mut self, name: ParameterName, bound: f64) -> Self {
        self.overrides.push((name, SpecField::LowerBound, bound));
        self
    }

    /// Set the adjustment step of a parameter.
    pub fn increment(mut self, name: ParameterName, increment: f64) -> Self {
        self.overrides.push((name, SpecField::Increment, increment));
        self
    }

    /// Set the status classification rules.
    pub fn status_rules(mut self, rules: StatusRules) -> Self {
        self.config.status = rules;
        self
    }

    /// Set the marker discretization.
    pub fn markers(mut self, markers: MarkerScale) -> Self {
        self.config.display.markers = markers;
        self
    }

    /// Set the smallest shared y-axis upper bound.
    pub fn y_axis_floor(mut self, floor: f64) -> Self {
        self.config.display.y_axis_floor = floor;
        self
    }

    /// Set the prefix of status asset names.
    pub fn asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.display.asset_prefix = prefix.into();
        self
    }

    /// Resolve all settings into a validated configuration.
    pub fn build_config(self) -> Result<EngineConfig, ConfigError> {
        let mut config = self.config;

        if let Some((time_min, time_max, time_step)) = self.grid {
            config.grid = TimeGrid::new(time_min, time_max, time_step)?;
        }

        for (name, field, value) in self.overrides {
            let spec = Self::spec_mut(&mut config.parameters, name)?;
            match field {
                SpecField::Value => spec.value = value,
                SpecField::LowerBound => spec.lower_bound = value,
                SpecField::Increment => spec.increment = value,
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Build and validate the session.
    pub fn build(self) -> EngineResult<Session> {
        Session::new(self.build_config()?)
    }

    fn spec_mut(
        specs: &mut [ParameterSpec],
        name: ParameterName,
    ) -> Result<&mut ParameterSpec, ConfigError> {
        specs
            .iter_mut()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ConfigError::ParameterSet(format!("missing {name}")))
    }
}
