use std::fmt;

use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::SdeModel;
use crate::base::{Compartment, CompartmentState, TimeGrid, COMPARTMENTS};
use crate::errors::SolveError;
use crate::simulation::ParameterVector;

/// Numerical integration of an [`SdeModel`] over a [`TimeGrid`].
pub trait SdeIntegrator: Send + Sync + fmt::Debug {
    /// Integrate from `initial` at the first grid time and return one sample
    /// per grid point. The same `seed` must always give the same samples.
    fn integrate(
        &self,
        model: &dyn SdeModel,
        initial: CompartmentState,
        grid: &TimeGrid,
        params: &ParameterVector,
        seed: u64,
    ) -> Result<Vec<CompartmentState>, SolveError>;
}

/// Fixed-step Euler–Maruyama scheme.
///
/// Each grid step is split into `substeps` equal sub-steps. Counts are
/// clamped at zero after every sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerMaruyama {
    substeps: usize,
    divergence_limit: f64,
}

impl EulerMaruyama {
    /// Create the scheme. `substeps` is raised to at least one.
    pub fn new(substeps: usize, divergence_limit: f64) -> Self {
        Self {
            substeps: substeps.max(1),
            divergence_limit,
        }
    }

    /// Sub-steps per grid step.
    pub fn substeps(&self) -> usize {
        self.substeps
    }

    /// Largest count accepted before the solve is declared divergent.
    pub fn divergence_limit(&self) -> f64 {
        self.divergence_limit
    }
}

impl Default for EulerMaruyama {
    fn default() -> Self {
        Self::new(10, 1e12)
    }
}

impl SdeIntegrator for EulerMaruyama {
    fn integrate(
        &self,
        model: &dyn SdeModel,
        initial: CompartmentState,
        grid: &TimeGrid,
        params: &ParameterVector,
        seed: u64,
    ) -> Result<Vec<CompartmentState>, SolveError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let n = grid.len();
        let dt = grid.time_step() / self.substeps as f64;
        let sqrt_dt = dt.sqrt();

        let mut x = initial.to_array();
        let mut samples = Vec::with_capacity(n);
        samples.push(initial);

        for i in 1..n {
            let t0 = grid.time_min() + (i - 1) as f64 * grid.time_step();

            for k in 0..self.substeps {
                let t = t0 + k as f64 * dt;
                let state = CompartmentState::from(x);
                let mu = model.drift(&state, params, t);
                let sigma = model.diffusion(&state, params, t);

                for c in 0..COMPARTMENTS {
                    let dw: f64 = StandardNormal.sample(&mut rng);
                    let next = x[c] + mu[c] * dt + sigma[c] * sqrt_dt * dw;

                    // Check before clamping: f64::max swallows NaN.
                    if !next.is_finite() || next > self.divergence_limit {
                        return Err(SolveError::Diverged {
                            compartment: Compartment::ALL[c],
                            time: t + dt,
                        });
                    }
                    x[c] = next.max(0.0);
                }
            }

            samples.push(CompartmentState::from(x));
        }

        Ok(samples)
    }
}
