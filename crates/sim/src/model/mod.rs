//! Population dynamics of the three-compartment model.
//!
//! The model is split into a deterministic drift and an additive diffusion
//! term, exposed through [`SdeModel`] so integrators can treat it as a black
//! box.

mod integrator;

pub use integrator::{EulerMaruyama, SdeIntegrator};

use serde::{Deserialize, Serialize};

use crate::base::{CompartmentState, COMPARTMENTS};
use crate::simulation::{ParameterName, ParameterVector};

/// A stochastic differential equation `dX = f(X, p, t) dt + g(X, p, t) dW`.
///
/// Implementations must be pure: integrators call them many times per step.
pub trait SdeModel: Send + Sync {
    /// Deterministic rate of change.
    fn drift(
        &self,
        state: &CompartmentState,
        params: &ParameterVector,
        time: f64,
    ) -> [f64; COMPARTMENTS];

    /// Per-compartment noise magnitude.
    fn diffusion(
        &self,
        state: &CompartmentState,
        params: &ParameterVector,
        time: f64,
    ) -> [f64; COMPARTMENTS];
}

/// Default diffusion magnitude for every compartment.
pub const DEFAULT_NOISE: [f64; COMPARTMENTS] = [10.0, 10.0, 10.0];

/// Stem → progenitor → differentiated model with constant additive noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StemCellModel {
    noise: [f64; COMPARTMENTS],
}

impl StemCellModel {
    /// Create the model with the given per-compartment noise magnitudes.
    pub fn new(noise: [f64; COMPARTMENTS]) -> Self {
        Self { noise }
    }

    /// Noise magnitudes.
    pub fn noise(&self) -> [f64; COMPARTMENTS] {
        self.noise
    }
}

impl Default for StemCellModel {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE)
    }
}

impl SdeModel for StemCellModel {
    fn drift(
        &self,
        state: &CompartmentState,
        params: &ParameterVector,
        _time: f64,
    ) -> [f64; COMPARTMENTS] {
        use ParameterName::*;

        let (s, p, d) = (state.stem, state.progenitor, state.differentiated);

        let stem = params[Lambda] + params[A1] * s - params[A3] * s - params[D1] * s;
        let progenitor = params[A2] * s + params[A4] * p + 2.0 * params[A3] * s
            - params[A6] * p
            - params[D2] * p;
        let differentiated = params[A5] * p + 2.0 * params[A6] * p - params[D3] * d;

        [stem, progenitor, differentiated]
    }

    fn diffusion(
        &self,
        _state: &CompartmentState,
        _params: &ParameterVector,
        _time: f64,
    ) -> [f64; COMPARTMENTS] {
        self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ParameterStore;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_drift_at_initial_state() {
        let model = StemCellModel::default();
        let params = ParameterStore::default().vector();
        let state = CompartmentState::new(1000.0, 100.0, 100.0);

        let rates = model.drift(&state, &params, 0.0);

        // 20 + (0.33 - 0.35 - 0.0) * 1000
        assert!((rates[0] - 0.0).abs() < TOLERANCE);
        // 0.3*1000 + 0.33*100 + 0.7*1000 - 0.33*100 - 0.4*100
        assert!((rates[1] - 960.0).abs() < TOLERANCE);
        // 0.33*100 + 0.66*100 - 0.5*100
        assert!((rates[2] - 49.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drift_is_zero_at_steady_state() {
        let model = StemCellModel::default();
        let params = ParameterStore::default().vector();
        // Fixed point of the default parameter set
        let state = CompartmentState::new(1000.0, 2500.0, 4950.0);

        let rates = model.drift(&state, &params, 42.0);
        for r in rates {
            assert!(r.abs() < 1e-6, "rate {r} should vanish at the fixed point");
        }
    }

    #[test]
    fn test_diffusion_is_constant() {
        let model = StemCellModel::new([1.0, 2.0, 3.0]);
        let params = ParameterStore::default().vector();
        let a = model.diffusion(&CompartmentState::new(0.0, 0.0, 0.0), &params, 0.0);
        let b = model.diffusion(&CompartmentState::new(1e6, 5.0, 7.0), &params, 99.0);
        assert_eq!(a, [1.0, 2.0, 3.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_drift_is_pure() {
        let model = StemCellModel::default();
        let params = ParameterStore::default().vector();
        let state = CompartmentState::new(812.0, 1300.0, 2000.0);
        let first = model.drift(&state, &params, 1.0);
        let second = model.drift(&state, &params, 1.0);
        assert_eq!(first, second);
        assert_eq!(state, CompartmentState::new(812.0, 1300.0, 2000.0));
    }
}
