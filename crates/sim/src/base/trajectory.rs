use serde::{Deserialize, Serialize};

use super::{Compartment, CompartmentState, TimeGrid};
use crate::errors::SolveError;

/// A full solution of the model for one parameter vector, sampled on the
/// session's time grid.
///
/// Immutable once built: a parameter change produces a new trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    stem: Vec<f64>,
    progenitor: Vec<f64>,
    differentiated: Vec<f64>,
}

impl Trajectory {
    /// Assemble a trajectory from one sample per grid point.
    ///
    /// Fails with [`SolveError::Truncated`] unless there is exactly one
    /// sample for every point of `grid`.
    pub fn from_samples(grid: &TimeGrid, samples: &[CompartmentState]) -> Result<Self, SolveError> {
        let expected = grid.len();
        if samples.len() != expected {
            return Err(SolveError::Truncated {
                expected,
                got: samples.len(),
            });
        }

        Ok(Self {
            times: grid.times().collect(),
            stem: samples.iter().map(|s| s.stem).collect(),
            progenitor: samples.iter().map(|s| s.progenitor).collect(),
            differentiated: samples.iter().map(|s| s.differentiated).collect(),
        })
    }

    /// Number of samples per compartment.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Check if the trajectory holds no samples.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Series of a single compartment.
    pub fn series(&self, compartment: Compartment) -> &[f64] {
        match compartment {
            Compartment::Stem => &self.stem,
            Compartment::Progenitor => &self.progenitor,
            Compartment::Differentiated => &self.differentiated,
        }
    }

    /// State at a grid index.
    pub fn state_at(&self, index: usize) -> Option<CompartmentState> {
        Some(CompartmentState::new(
            *self.stem.get(index)?,
            *self.progenitor.get(index)?,
            *self.differentiated.get(index)?,
        ))
    }

    /// Iterate over `(time, state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, CompartmentState)> + '_ {
        self.times
            .iter()
            .enumerate()
            .filter_map(|(i, &t)| self.state_at(i).map(|s| (t, s)))
    }

    /// Largest count over every compartment and every sample.
    pub fn max_count(&self) -> f64 {
        self.stem
            .iter()
            .chain(&self.progenitor)
            .chain(&self.differentiated)
            .copied()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> TimeGrid {
        TimeGrid::new(0.0, 1.0, 0.5).unwrap()
    }

    #[test]
    fn test_from_samples() {
        let samples = [
            CompartmentState::new(1.0, 2.0, 3.0),
            CompartmentState::new(4.0, 5.0, 6.0),
            CompartmentState::new(7.0, 8.0, 9.5),
        ];
        let trajectory = Trajectory::from_samples(&small_grid(), &samples).unwrap();

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.times(), &[0.0, 0.5, 1.0]);
        assert_eq!(trajectory.series(Compartment::Progenitor), &[2.0, 5.0, 8.0]);
        assert_eq!(trajectory.state_at(1), Some(samples[1]));
        assert_eq!(trajectory.state_at(3), None);
        assert_eq!(trajectory.max_count(), 9.5);
        assert_eq!(trajectory.iter().count(), 3);
    }

    #[test]
    fn test_short_sample_list_is_rejected() {
        let samples = [CompartmentState::new(1.0, 2.0, 3.0)];
        let err = Trajectory::from_samples(&small_grid(), &samples).unwrap_err();
        assert_eq!(err, SolveError::Truncated { expected: 3, got: 1 });
    }
}
