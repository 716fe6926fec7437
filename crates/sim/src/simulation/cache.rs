//! Single-entry cache of solved trajectories.
//!
//! The cache owns the association between a parameter vector and the
//! trajectory it produced. Entries are swapped as a whole behind an `Arc`, so
//! readers see either the previous pair or the new one.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::base::{CompartmentState, TimeGrid, Trajectory};
use crate::errors::{EngineError, EngineResult, SolveError};
use crate::model::{SdeIntegrator, SdeModel, StemCellModel};
use crate::simulation::ParameterVector;

/// A trajectory together with the parameters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSolve {
    parameters: ParameterVector,
    trajectory: Arc<Trajectory>,
    revision: u64,
}

impl CachedSolve {
    /// Parameters the trajectory was solved for.
    pub fn parameters(&self) -> &ParameterVector {
        &self.parameters
    }

    /// Shared handle to the trajectory.
    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    /// Number of trajectories installed before this one.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Solves the model for a parameter vector and keeps the latest result.
#[derive(Debug)]
pub struct SolveCache {
    model: StemCellModel,
    integrator: Box<dyn SdeIntegrator>,
    grid: TimeGrid,
    initial_state: CompartmentState,
    seed: u64,
    current: RwLock<Arc<CachedSolve>>,
}

impl SolveCache {
    /// Create the cache and solve the initial parameter vector.
    pub fn new(
        model: StemCellModel,
        integrator: Box<dyn SdeIntegrator>,
        grid: TimeGrid,
        initial_state: CompartmentState,
        seed: u64,
        initial: &ParameterVector,
    ) -> Result<Self, SolveError> {
        let trajectory = Self::integrate(
            &model,
            integrator.as_ref(),
            &grid,
            initial_state,
            seed,
            initial,
        )?;
        let entry = CachedSolve {
            parameters: *initial,
            trajectory: Arc::new(trajectory),
            revision: 0,
        };

        Ok(Self {
            model,
            integrator,
            grid,
            initial_state,
            seed,
            current: RwLock::new(Arc::new(entry)),
        })
    }

    /// Time grid every trajectory is sampled on.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Seed used for every solve.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The cached entry. The read lock is released before returning.
    pub fn current(&self) -> EngineResult<Arc<CachedSolve>> {
        let slot = self
            .current
            .read()
            .map_err(|_| EngineError::LockPoisoned("cache.current"))?;
        Ok(Arc::clone(&slot))
    }

    /// Solve `params` without touching the cached entry.
    pub fn compute(&self, params: &ParameterVector) -> Result<Trajectory, SolveError> {
        Self::integrate(
            &self.model,
            self.integrator.as_ref(),
            &self.grid,
            self.initial_state,
            self.seed,
            params,
        )
    }

    /// Return the trajectory for `params`, solving and installing it if the
    /// cached entry belongs to a different vector.
    ///
    /// On failure the previous entry stays in place.
    pub fn solve(&self, params: &ParameterVector) -> EngineResult<Arc<CachedSolve>> {
        let cached = self.current()?;
        if cached.parameters == *params {
            debug!("Solve cache hit at revision {}", cached.revision);
            return Ok(cached);
        }

        let trajectory = self.compute(params)?;

        let mut slot = self
            .current
            .write()
            .map_err(|_| EngineError::LockPoisoned("cache.install"))?;
        let entry = Arc::new(CachedSolve {
            parameters: *params,
            trajectory: Arc::new(trajectory),
            revision: slot.revision + 1,
        });
        *slot = Arc::clone(&entry);
        debug!("Installed trajectory revision {}", entry.revision);

        Ok(entry)
    }

    fn integrate(
        model: &dyn SdeModel,
        integrator: &dyn SdeIntegrator,
        grid: &TimeGrid,
        initial_state: CompartmentState,
        seed: u64,
        params: &ParameterVector,
    ) -> Result<Trajectory, SolveError> {
        let samples = integrator.integrate(model, initial_state, grid, params, seed)?;
        Trajectory::from_samples(grid, &samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EulerMaruyama;
    use crate::simulation::{Direction, ParameterName, ParameterStore};

    /// Integrator that stops one sample short of the grid.
    #[derive(Debug)]
    struct ShortIntegrator;

    impl SdeIntegrator for ShortIntegrator {
        fn integrate(
            &self,
            _model: &dyn SdeModel,
            initial: CompartmentState,
            grid: &TimeGrid,
            _params: &ParameterVector,
            _seed: u64,
        ) -> Result<Vec<CompartmentState>, SolveError> {
            Ok(vec![initial; grid.len() - 1])
        }
    }

    fn test_cache(grid: TimeGrid) -> SolveCache {
        SolveCache::new(
            StemCellModel::default(),
            Box::new(EulerMaruyama::default()),
            grid,
            CompartmentState::new(1000.0, 100.0, 100.0),
            42,
            &ParameterStore::default().vector(),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_entry() {
        let cache = test_cache(TimeGrid::default());
        let entry = cache.current().unwrap();
        assert_eq!(entry.revision(), 0);
        assert_eq!(entry.trajectory().len(), 1001);
        assert_eq!(
            entry.trajectory().state_at(0),
            Some(CompartmentState::new(1000.0, 100.0, 100.0))
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let cache = test_cache(TimeGrid::new(0.0, 20.0, 0.1).unwrap());
        let params = ParameterStore::default().vector();
        assert_eq!(cache.compute(&params).unwrap(), cache.compute(&params).unwrap());
        assert_eq!(
            &cache.compute(&params).unwrap(),
            cache.current().unwrap().trajectory().as_ref()
        );
    }

    #[test]
    fn test_same_vector_is_a_cache_hit() {
        let cache = test_cache(TimeGrid::new(0.0, 10.0, 0.1).unwrap());
        let before = cache.current().unwrap();
        let after = cache.solve(&ParameterStore::default().vector()).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.revision(), 0);
    }

    #[test]
    fn test_changed_vector_replaces_entry() {
        let cache = test_cache(TimeGrid::new(0.0, 10.0, 0.1).unwrap());
        let mut store = ParameterStore::default();
        store.apply_delta(ParameterName::D3, Direction::Increase);

        let entry = cache.solve(&store.vector()).unwrap();
        assert_eq!(entry.revision(), 1);
        assert_eq!(entry.parameters(), &store.vector());
        assert!(Arc::ptr_eq(&entry, &cache.current().unwrap()));
    }

    #[test]
    fn test_failed_solve_keeps_previous_entry() {
        let cache = SolveCache::new(
            StemCellModel::default(),
            Box::new(EulerMaruyama::new(10, 1e5)),
            TimeGrid::default(),
            CompartmentState::new(1000.0, 100.0, 100.0),
            42,
            &ParameterStore::default().vector(),
        )
        .unwrap();
        let before = cache.current().unwrap();

        let mut store = ParameterStore::default();
        for _ in 0..50 {
            store.apply_delta(ParameterName::A1, Direction::Increase);
        }

        assert!(matches!(
            cache.solve(&store.vector()),
            Err(EngineError::Solve(SolveError::Diverged { .. }))
        ));
        assert!(Arc::ptr_eq(&before, &cache.current().unwrap()));
    }

    #[test]
    fn test_short_trajectory_is_rejected() {
        let result = SolveCache::new(
            StemCellModel::default(),
            Box::new(ShortIntegrator),
            TimeGrid::new(0.0, 1.0, 0.1).unwrap(),
            CompartmentState::new(1.0, 1.0, 1.0),
            42,
            &ParameterStore::default().vector(),
        );
        assert!(matches!(
            result,
            Err(SolveError::Truncated { expected: 11, got: 10 })
        ));
    }
}
