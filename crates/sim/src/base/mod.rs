//! Base types for population state representation.
//!
//! This module provides the foundational types shared by every stage of the
//! engine: the tracked compartments, the fixed time grid and the sampled
//! trajectory.

mod compartment;
mod grid;
mod trajectory;

pub use compartment::{Compartment, CompartmentState, COMPARTMENTS};
pub use grid::{TimeGrid, MAX_GRID_POINTS};
pub use trajectory::Trajectory;
