//! Reactive controller of one interactive session.
//!
//! A [`Session`] owns an independent parameter store, solve cache and
//! projector. Parameter-change events mutate the store, refresh the cache and
//! republish outputs; time queries project the cached trajectory without
//! re-solving. Outputs are published on `tokio::sync::watch` channels, which
//! work without a runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::base::{CompartmentState, TimeGrid, Trajectory, COMPARTMENTS};
use crate::errors::{EngineError, EngineResult};
use crate::model::{EulerMaruyama, StemCellModel};
use crate::simulation::{
    CachedSolve, Direction, EngineConfig, ParameterName, ParameterStore, ParameterVector,
    SolveCache, StateProjector, StatusLabel,
};

/// Request to move one parameter by one increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterChange {
    pub name: ParameterName,
    pub direction: Direction,
}

impl ParameterChange {
    pub fn new(name: ParameterName, direction: Direction) -> Self {
        Self { name, direction }
    }

    /// Build a change from an untyped parameter identifier.
    ///
    /// Unknown identifiers are rejected here, before reaching the session.
    pub fn parse(name: &str, direction: Direction) -> EngineResult<Self> {
        Ok(Self::new(name.parse()?, direction))
    }

    pub fn increase(name: ParameterName) -> Self {
        Self::new(name, Direction::Increase)
    }

    pub fn decrease(name: ParameterName) -> Self {
        Self::new(name, Direction::Decrease)
    }
}

/// A parameter change as delivered by a UI control.
///
/// `trigger` is the control's click counter. It only grows, so an event whose
/// counter is not above the last one seen for the same control is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub change: ParameterChange,
    pub trigger: u64,
}

impl ControlEvent {
    pub fn new(change: ParameterChange, trigger: u64) -> Self {
        Self { change, trigger }
    }
}

/// What happened to a parameter-change request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeOutcome {
    /// The parameter moved and a new trajectory was installed.
    Applied { value: f64, revision: u64 },
    /// The parameter was already at its floor; nothing was recomputed.
    Unchanged { value: f64 },
    /// The control event repeated an already seen trigger count.
    Stale,
}

impl ChangeOutcome {
    /// True when new outputs were published.
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied { .. })
    }
}

/// Whether a recompute is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Recomputing,
}

/// Outputs republished after every applied parameter change.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOutputs {
    /// Revision of the trajectory
    pub revision: u64,
    /// Parameters the trajectory was solved for
    pub parameters: ParameterVector,
    /// `"<name>: <value>"` per parameter, canonical order
    pub displays: Vec<String>,
    /// Full trajectory for time-series views
    pub trajectory: Arc<Trajectory>,
    /// Shared y-axis upper bound
    pub y_axis_max: f64,
}

/// Outputs republished after every time query.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOutputs {
    /// Revision of the trajectory the state was read from
    pub revision: u64,
    /// Queried grid time
    pub time: f64,
    /// Compartment counts at `time`
    pub state: CompartmentState,
    /// Status classification of `state`
    pub status: StatusLabel,
    /// Asset name of `status`
    pub asset: String,
    /// Visual marker count per compartment
    pub markers: [usize; COMPARTMENTS],
    /// Shared y-axis upper bound
    pub y_axis_max: f64,
}

/// Resets the recomputing flag when a recompute ends, even on error.
struct RecomputeGuard<'a>(&'a AtomicBool);

impl<'a> RecomputeGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RecomputeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One interactive simulation session.
#[derive(Debug)]
pub struct Session {
    projector: StateProjector,
    cache: SolveCache,
    /// Holding this lock is what "recomputing" means.
    store: Mutex<ParameterStore>,
    recomputing: AtomicBool,
    triggers: Mutex<HashMap<ParameterChange, u64>>,
    last_query: Mutex<Option<f64>>,
    parameter_tx: watch::Sender<Arc<ParameterOutputs>>,
    time_tx: watch::Sender<Option<Arc<TimeOutputs>>>,
}

impl Session {
    /// Validate `config`, solve the initial parameter vector and publish the
    /// first parameter outputs.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let store = ParameterStore::from_specs(&config.parameters)?;
        let cache = SolveCache::new(
            StemCellModel::new(config.noise),
            Box::new(EulerMaruyama::new(config.substeps, config.divergence_limit)),
            config.grid,
            config.initial_state,
            config.seed,
            &store.vector(),
        )?;
        let projector = StateProjector::new(config.grid, config.status, config.display);

        let initial = cache.current()?;
        let outputs = Self::parameter_outputs_for(&projector, &store, &initial);
        let (parameter_tx, _) = watch::channel(Arc::new(outputs));
        let (time_tx, _) = watch::channel(None);

        info!(
            "Session ready: {} grid points, seed {}",
            config.grid.len(),
            cache.seed()
        );

        Ok(Self {
            projector,
            cache,
            store: Mutex::new(store),
            recomputing: AtomicBool::new(false),
            triggers: Mutex::new(HashMap::new()),
            last_query: Mutex::new(None),
            parameter_tx,
            time_tx,
        })
    }

    /// Time grid of this session.
    pub fn grid(&self) -> &TimeGrid {
        self.cache.grid()
    }

    /// Seed used for every solve.
    pub fn seed(&self) -> u64 {
        self.cache.seed()
    }

    /// Projector used for time queries.
    pub fn projector(&self) -> &StateProjector {
        &self.projector
    }

    /// Idle, or recomputing a trajectory.
    pub fn state(&self) -> ControllerState {
        if self.recomputing.load(Ordering::SeqCst) {
            ControllerState::Recomputing
        } else {
            ControllerState::Idle
        }
    }

    /// Cached trajectory and the parameters it belongs to.
    pub fn current(&self) -> EngineResult<Arc<CachedSolve>> {
        self.cache.current()
    }

    /// Parameters of the cached trajectory.
    pub fn parameters(&self) -> EngineResult<ParameterVector> {
        Ok(*self.cache.current()?.parameters())
    }

    /// Current value of a parameter.
    pub fn value(&self, name: ParameterName) -> EngineResult<f64> {
        Ok(self.parameters()?.get(name))
    }

    /// Latest parameter outputs.
    pub fn parameter_outputs(&self) -> Arc<ParameterOutputs> {
        Arc::clone(&self.parameter_tx.borrow())
    }

    /// Latest time outputs, if a time has been queried.
    pub fn time_outputs(&self) -> Option<Arc<TimeOutputs>> {
        self.time_tx.borrow().clone()
    }

    /// Receive every parameter republication.
    pub fn subscribe_parameters(&self) -> watch::Receiver<Arc<ParameterOutputs>> {
        self.parameter_tx.subscribe()
    }

    /// Receive every time-query republication.
    pub fn subscribe_time(&self) -> watch::Receiver<Option<Arc<TimeOutputs>>> {
        self.time_tx.subscribe()
    }

    /// Apply a control event, ignoring stale trigger counts.
    pub fn on_control_event(&self, event: ControlEvent) -> EngineResult<ChangeOutcome> {
        {
            let mut triggers = self
                .triggers
                .lock()
                .map_err(|_| EngineError::LockPoisoned("session.triggers"))?;
            let last = triggers.entry(event.change).or_insert(0);
            if event.trigger <= *last {
                debug!(
                    "Ignoring stale {} {} trigger {}",
                    event.change.direction, event.change.name, event.trigger
                );
                return Ok(ChangeOutcome::Stale);
            }
            *last = event.trigger;
        }
        self.on_parameter_change(event.change)
    }

    /// Move a parameter by one increment and, if it changed, re-solve and
    /// republish.
    ///
    /// The change is computed on a copy of the store and only committed once
    /// the new trajectory is installed, so a failed solve leaves both the
    /// parameters and the trajectory untouched.
    pub fn on_parameter_change(&self, change: ParameterChange) -> EngineResult<ChangeOutcome> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| EngineError::LockPoisoned("session.store"))?;

        let mut candidate = store.clone();
        let adjustment = candidate.apply_delta(change.name, change.direction);
        if !adjustment.changed {
            debug!(
                "{} {} is a no-op at {}",
                change.direction, change.name, adjustment.value
            );
            return Ok(ChangeOutcome::Unchanged {
                value: adjustment.value,
            });
        }

        let solved = {
            let _guard = RecomputeGuard::enter(&self.recomputing);
            self.cache.solve(&candidate.vector())
        };
        let entry = match solved {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "Rolled back {} of {} to {}: {e}",
                    change.direction,
                    change.name,
                    store.get_value(change.name)
                );
                return Err(e);
            }
        };

        *store = candidate;
        info!(
            "{} {} -> {:.4} (revision {})",
            change.direction,
            change.name,
            adjustment.value,
            entry.revision()
        );

        let outputs = Self::parameter_outputs_for(&self.projector, &store, &entry);
        self.parameter_tx.send_replace(Arc::new(outputs));
        if let Err(e) = self.reproject_last_query(&entry) {
            warn!(
                "Applied {} {} but could not refresh time outputs: {e}",
                change.direction, change.name
            );
        }

        Ok(ChangeOutcome::Applied {
            value: adjustment.value,
            revision: entry.revision(),
        })
    }

    /// Project the cached trajectory at `time` and republish the result.
    ///
    /// `time` must be a grid point; use [`TimeGrid::snap`] first for
    /// free-form input.
    pub fn on_time_query(&self, time: f64) -> EngineResult<Arc<TimeOutputs>> {
        // Held until published so a concurrent recompute re-projects this
        // time, not the previous one.
        let mut last_query = self
            .last_query
            .lock()
            .map_err(|_| EngineError::LockPoisoned("session.last_query"))?;

        let entry = self.cache.current()?;
        let outputs = Arc::new(self.time_outputs_for(&entry, time)?);

        *last_query = Some(time);
        self.publish_time(Arc::clone(&outputs));

        Ok(outputs)
    }

    fn reproject_last_query(&self, entry: &CachedSolve) -> EngineResult<()> {
        let last_query = self
            .last_query
            .lock()
            .map_err(|_| EngineError::LockPoisoned("session.last_query"))?;
        if let Some(time) = *last_query {
            let outputs = self.time_outputs_for(entry, time)?;
            self.publish_time(Arc::new(outputs));
        }
        Ok(())
    }

    /// Publish unless a newer revision is already visible, so a query racing
    /// a recompute cannot overwrite fresher outputs.
    fn publish_time(&self, outputs: Arc<TimeOutputs>) {
        self.time_tx.send_if_modified(|slot| {
            let superseded = matches!(slot, Some(current) if current.revision > outputs.revision);
            if superseded {
                return false;
            }
            *slot = Some(outputs);
            true
        });
    }

    fn time_outputs_for(&self, entry: &CachedSolve, time: f64) -> EngineResult<TimeOutputs> {
        let trajectory = entry.trajectory();
        let state = self.projector.project(trajectory, time)?;
        let status = self.projector.status(&state, time);

        Ok(TimeOutputs {
            revision: entry.revision(),
            time,
            state,
            status,
            asset: self.projector.asset_name(status),
            markers: self.projector.markers(&state),
            y_axis_max: self.projector.y_axis_max(trajectory),
        })
    }

    fn parameter_outputs_for(
        projector: &StateProjector,
        store: &ParameterStore,
        entry: &CachedSolve,
    ) -> ParameterOutputs {
        ParameterOutputs {
            revision: entry.revision(),
            parameters: *entry.parameters(),
            displays: store.displays(),
            trajectory: Arc::clone(entry.trajectory()),
            y_axis_max: projector.y_axis_max(entry.trajectory()),
        }
    }
}
