//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use stemflow_sim::prelude::*;
//!
//! let session = Session::new(EngineConfig::default()).unwrap();
//! let outputs = session.on_time_query(0.0).unwrap();
//! assert_eq!(outputs.state, CompartmentState::new(1000.0, 100.0, 100.0));
//! ```

pub use crate::base::{Compartment, CompartmentState, TimeGrid, Trajectory};
pub use crate::errors::{ConfigError, EngineError, EngineResult, SolveError};
pub use crate::model::{EulerMaruyama, SdeIntegrator, SdeModel, StemCellModel};
pub use crate::simulation::{
    ChangeOutcome, ControlEvent, Direction, EngineConfig, ParameterChange, ParameterName,
    ParameterStore, Session, SessionBuilder, StatusLabel, StatusRules,
};
