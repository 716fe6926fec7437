//! # Simulation Crate
//!
//! The `sim` crate provides the reactive engine behind the stem cell
//! population explorer. It includes the three-compartment SDE model, the
//! bounded parameter store, the trajectory cache, state projection with
//! status classification, and the session controller tying them together.

pub mod base;
pub mod errors;
pub mod model;
pub mod simulation;
pub mod prelude;

pub use base::{Compartment, CompartmentState, TimeGrid, Trajectory};
