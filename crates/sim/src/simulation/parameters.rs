//! Model parameters and the bounded parameter store.
//!
//! The ten rates of the model are addressed through the closed
//! [`ParameterName`] enum. Values live in a [`ParameterStore`], which only
//! moves them by whole increments and never below their lower bound.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, EngineError, EngineResult};

/// Number of model parameters.
pub const PARAMETER_COUNT: usize = 10;

/// Identifier of a model parameter.
///
/// Variants are declared in canonical vector order:
/// `[λ, a1, a2, a3, a4, a5, a6, d1, d3, d2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterName {
    /// Stem cell production rate (λ)
    Lambda,
    /// Stem cell self-renewal
    A1,
    /// Stem cell asymmetric division
    A2,
    /// Stem cell symmetric differentiation
    A3,
    /// Progenitor self-renewal
    A4,
    /// Progenitor asymmetric division
    A5,
    /// Progenitor symmetric differentiation
    A6,
    /// Stem cell death
    D1,
    /// Differentiated cell death
    D3,
    /// Progenitor death
    D2,
}

impl ParameterName {
    /// All parameters in canonical order.
    pub const ALL: [ParameterName; PARAMETER_COUNT] = [
        ParameterName::Lambda,
        ParameterName::A1,
        ParameterName::A2,
        ParameterName::A3,
        ParameterName::A4,
        ParameterName::A5,
        ParameterName::A6,
        ParameterName::D1,
        ParameterName::D3,
        ParameterName::D2,
    ];

    /// Position in the parameter vector.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short machine identifier.
    pub const fn id(self) -> &'static str {
        match self {
            ParameterName::Lambda => "lambda",
            ParameterName::A1 => "a1",
            ParameterName::A2 => "a2",
            ParameterName::A3 => "a3",
            ParameterName::A4 => "a4",
            ParameterName::A5 => "a5",
            ParameterName::A6 => "a6",
            ParameterName::D1 => "d1",
            ParameterName::D3 => "d3",
            ParameterName::D2 => "d2",
        }
    }

    /// Human-readable name used in display strings.
    pub const fn label(self) -> &'static str {
        match self {
            ParameterName::Lambda => "Stem cell production (λ)",
            ParameterName::A1 => "Stem cell self-renewal (a1)",
            ParameterName::A2 => "Stem cell asymmetric division (a2)",
            ParameterName::A3 => "Stem cell symmetric differentiation (a3)",
            ParameterName::A4 => "Progenitor self-renewal (a4)",
            ParameterName::A5 => "Progenitor asymmetric division (a5)",
            ParameterName::A6 => "Progenitor symmetric differentiation (a6)",
            ParameterName::D1 => "Stem cell death (d1)",
            ParameterName::D3 => "Red blood cell death (d3)",
            ParameterName::D2 => "Progenitor death (d2)",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParameterName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "λ" {
            return Ok(ParameterName::Lambda);
        }
        ParameterName::ALL
            .into_iter()
            .find(|name| name.id().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::UnknownParameter(s.to_string()))
    }
}

/// Direction of an interactive adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increase => f.write_str("increase"),
            Direction::Decrease => f.write_str("decrease"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" | "up" | "+" => Ok(Direction::Increase),
            "decrease" | "down" | "-" => Ok(Direction::Decrease),
            other => Err(format!("Unknown direction '{other}'. Use: up or down")),
        }
    }
}

/// Configuration of a single parameter: starting value, floor and step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: ParameterName,
    pub value: f64,
    #[serde(default)]
    pub lower_bound: f64,
    pub increment: f64,
}

impl ParameterSpec {
    /// Create a new parameter specification.
    pub fn new(name: ParameterName, value: f64, lower_bound: f64, increment: f64) -> Self {
        Self {
            name,
            value,
            lower_bound,
            increment,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidParameter {
            name: self.name.id().to_string(),
            reason,
        };
        if !self.lower_bound.is_finite() {
            return Err(invalid(format!("lower bound {} is not finite", self.lower_bound)));
        }
        if !self.value.is_finite() || self.value < self.lower_bound {
            return Err(invalid(format!(
                "value {} is below its lower bound {}",
                self.value, self.lower_bound
            )));
        }
        if !self.increment.is_finite() || self.increment <= 0.0 {
            return Err(invalid(format!(
                "increment must be positive, got {}",
                self.increment
            )));
        }
        Ok(())
    }
}

/// Default parameter set of the reference scenario, in canonical order.
///
/// λ has a positive floor so the stem compartment is always fed.
pub fn default_parameter_specs() -> Vec<ParameterSpec> {
    use ParameterName::*;
    vec![
        ParameterSpec::new(Lambda, 20.0, 1.0, 1.0),
        ParameterSpec::new(A1, 0.33, 0.0, 0.01),
        ParameterSpec::new(A2, 0.3, 0.0, 0.01),
        ParameterSpec::new(A3, 0.35, 0.0, 0.01),
        ParameterSpec::new(A4, 0.33, 0.0, 0.01),
        ParameterSpec::new(A5, 0.33, 0.0, 0.01),
        ParameterSpec::new(A6, 0.33, 0.0, 0.01),
        ParameterSpec::new(D1, 0.0, 0.0, 0.01),
        ParameterSpec::new(D3, 0.5, 0.0, 0.01),
        ParameterSpec::new(D2, 0.4, 0.0, 0.01),
    ]
}

/// The ten model rates in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector([f64; PARAMETER_COUNT]);

impl ParameterVector {
    /// Wrap raw values given in canonical order.
    pub fn new(values: [f64; PARAMETER_COUNT]) -> Self {
        Self(values)
    }

    /// Value of a single parameter.
    #[inline]
    pub fn get(&self, name: ParameterName) -> f64 {
        self.0[name.index()]
    }

    /// Raw values in canonical order.
    pub fn as_array(&self) -> &[f64; PARAMETER_COUNT] {
        &self.0
    }

    /// Iterate over `(name, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterName, f64)> + '_ {
        ParameterName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

impl Index<ParameterName> for ParameterVector {
    type Output = f64;

    fn index(&self, name: ParameterName) -> &Self::Output {
        &self.0[name.index()]
    }
}

/// Result of applying a bounded adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// Value after the adjustment (unchanged on a no-op)
    pub value: f64,
    /// False when the adjustment was a no-op (already at the floor)
    pub changed: bool,
}

/// Holds the current parameter vector together with per-parameter floors and
/// increments.
///
/// Values only move through [`ParameterStore::apply_delta`], so every value
/// stays at or above its bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    values: ParameterVector,
    lower_bounds: [f64; PARAMETER_COUNT],
    increments: [f64; PARAMETER_COUNT],
}

impl ParameterStore {
    /// Build a store from specifications naming every parameter exactly once.
    pub fn from_specs(specs: &[ParameterSpec]) -> Result<Self, ConfigError> {
        let mut seen = [false; PARAMETER_COUNT];

        for spec in specs {
            spec.validate()?;
            let i = spec.name.index();
            if seen[i] {
                return Err(ConfigError::ParameterSet(format!(
                    "'{}' is listed more than once",
                    spec.name
                )));
            }
            seen[i] = true;
        }

        let missing: Vec<&str> = ParameterName::ALL
            .iter()
            .filter(|name| !seen[name.index()])
            .map(|name| name.id())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::ParameterSet(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self::assemble(specs))
    }

    /// Lay specifications out in canonical order. Callers check that every
    /// name appears exactly once.
    fn assemble(specs: &[ParameterSpec]) -> Self {
        let mut values = [0.0; PARAMETER_COUNT];
        let mut lower_bounds = [0.0; PARAMETER_COUNT];
        let mut increments = [0.0; PARAMETER_COUNT];

        for spec in specs {
            let i = spec.name.index();
            values[i] = spec.value;
            lower_bounds[i] = spec.lower_bound;
            increments[i] = spec.increment;
        }

        Self {
            values: ParameterVector(values),
            lower_bounds,
            increments,
        }
    }

    /// Current value of a parameter.
    pub fn get_value(&self, name: ParameterName) -> f64 {
        self.values.get(name)
    }

    /// Current value of a parameter addressed by its string identifier.
    pub fn get_value_by_id(&self, id: &str) -> EngineResult<f64> {
        let name: ParameterName = id.parse()?;
        Ok(self.get_value(name))
    }

    /// Floor of a parameter.
    pub fn lower_bound(&self, name: ParameterName) -> f64 {
        self.lower_bounds[name.index()]
    }

    /// Step used for interactive adjustment.
    pub fn increment(&self, name: ParameterName) -> f64 {
        self.increments[name.index()]
    }

    /// Copy of the current parameter vector.
    pub fn vector(&self) -> ParameterVector {
        self.values
    }

    /// Move a parameter by one increment.
    ///
    /// Decreases clamp at the lower bound. When the clamped result equals the
    /// current value the store is left untouched and `changed` is false.
    pub fn apply_delta(&mut self, name: ParameterName, direction: Direction) -> Adjustment {
        let i = name.index();
        let current = self.values.0[i];
        let proposed = match direction {
            Direction::Increase => current + self.increments[i],
            Direction::Decrease => (current - self.increments[i]).max(self.lower_bounds[i]),
        };

        if proposed == current {
            return Adjustment {
                value: current,
                changed: false,
            };
        }

        self.values.0[i] = proposed;
        Adjustment {
            value: proposed,
            changed: true,
        }
    }

    /// Display string: `"<human-readable name>: <value to 2 decimals>"`.
    pub fn display(&self, name: ParameterName) -> String {
        format!("{}: {:.2}", name.label(), self.get_value(name))
    }

    /// Display strings of all parameters in canonical order.
    pub fn displays(&self) -> Vec<String> {
        ParameterName::ALL
            .iter()
            .map(|&name| self.display(name))
            .collect()
    }

    /// Current state as specifications (value, floor, step).
    pub fn specs(&self) -> Vec<ParameterSpec> {
        ParameterName::ALL
            .iter()
            .map(|&name| {
                ParameterSpec::new(
                    name,
                    self.get_value(name),
                    self.lower_bound(name),
                    self.increment(name),
                )
            })
            .collect()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::assemble(&default_parameter_specs())
    }
}
