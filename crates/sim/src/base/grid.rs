use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Tolerance, in units of one step, for matching a time to a grid point.
const GRID_TOLERANCE: f64 = 1e-6;

/// Largest number of points a grid may hold.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Extra decimals kept beyond the step's own precision when rounding times.
const TIME_DECIMALS_MARGIN: i32 = 6;

/// Fixed, ordered sample times from `time_min` to `time_max` at `time_step`.
///
/// Every trajectory of a session is sampled on the same grid and every time
/// query must land on one of its points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    time_min: f64,
    time_max: f64,
    time_step: f64,
}

impl TimeGrid {
    /// Create a validated grid.
    ///
    /// The span must be a whole number of steps.
    pub fn new(time_min: f64, time_max: f64, time_step: f64) -> Result<Self, ConfigError> {
        let grid = Self {
            time_min,
            time_max,
            time_step,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check the grid invariants (also used after deserialization).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_min.is_finite()
            && self.time_max.is_finite()
            && self.time_step.is_finite())
        {
            return Err(ConfigError::InvalidGrid(
                "bounds and step must be finite".into(),
            ));
        }
        if self.time_step <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "step must be positive, got {}",
                self.time_step
            )));
        }
        if self.time_max < self.time_min {
            return Err(ConfigError::InvalidGrid(format!(
                "time_max {} is before time_min {}",
                self.time_max, self.time_min
            )));
        }
        let steps = (self.time_max - self.time_min) / self.time_step;
        if (steps - steps.round()).abs() > GRID_TOLERANCE {
            return Err(ConfigError::InvalidGrid(format!(
                "span [{}, {}] is not a whole number of {} steps",
                self.time_min, self.time_max, self.time_step
            )));
        }
        if steps.round() >= MAX_GRID_POINTS as f64 {
            return Err(ConfigError::InvalidGrid(format!(
                "span [{}, {}] at step {} exceeds {} points",
                self.time_min, self.time_max, self.time_step, MAX_GRID_POINTS
            )));
        }
        Ok(())
    }

    /// First grid time.
    pub fn time_min(&self) -> f64 {
        self.time_min
    }

    /// Last grid time.
    pub fn time_max(&self) -> f64 {
        self.time_max
    }

    /// Spacing between consecutive grid times.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of grid points (both ends included).
    pub fn len(&self) -> usize {
        ((self.time_max - self.time_min) / self.time_step).round() as usize + 1
    }

    /// A validated grid always holds at least one point.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Time of the `index`-th grid point.
    pub fn time_at(&self, index: usize) -> Option<f64> {
        let len = self.len();
        if index >= len {
            None
        } else if index == len - 1 {
            Some(self.time_max)
        } else {
            Some(self.round_time(self.time_min + index as f64 * self.time_step))
        }
    }

    /// Strip accumulated floating-point error from a computed grid time, so
    /// a step of 0.1 yields 0.3 rather than 0.30000000000000004.
    fn round_time(&self, time: f64) -> f64 {
        let decimals = (-self.time_step.log10()).ceil().max(0.0) as i32 + TIME_DECIMALS_MARGIN;
        if decimals > 15 {
            return time;
        }
        let scale = 10f64.powi(decimals);
        let rounded = (time * scale).round() / scale;
        if rounded.is_finite() {
            rounded
        } else {
            time
        }
    }

    /// All grid times in order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).filter_map(move |i| self.time_at(i))
    }

    /// Exact lookup of `time` on the grid.
    ///
    /// Returns `None` when `time` is outside the span or between two points.
    pub fn index_of(&self, time: f64) -> Option<usize> {
        if !time.is_finite() {
            return None;
        }
        let position = (time - self.time_min) / self.time_step;
        let nearest = position.round();
        if (position - nearest).abs() > GRID_TOLERANCE || nearest < 0.0 {
            return None;
        }
        let index = nearest as usize;
        (index < self.len()).then_some(index)
    }

    /// Clamp `time` into the span and round it to the nearest grid point.
    pub fn snap(&self, time: f64) -> f64 {
        if time.is_nan() {
            return self.time_min;
        }
        let clamped = time.clamp(self.time_min, self.time_max);
        let index = ((clamped - self.time_min) / self.time_step).round() as usize;
        self.time_at(index.min(self.len() - 1))
            .unwrap_or(self.time_max)
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            time_min: 0.0,
            time_max: 100.0,
            time_step: 0.1,
        }
    }
}
