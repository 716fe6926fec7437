use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Number of tracked population compartments.
pub const COMPARTMENTS: usize = 3;

/// One of the tracked population classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    /// Stem cells
    Stem,
    /// Progenitor cells
    Progenitor,
    /// Differentiated (red blood) cells
    Differentiated,
}

impl Compartment {
    /// All compartments in storage order.
    pub const ALL: [Compartment; COMPARTMENTS] = [
        Compartment::Stem,
        Compartment::Progenitor,
        Compartment::Differentiated,
    ];

    /// Position of this compartment in state vectors.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Compartment::Stem => "stem",
            Compartment::Progenitor => "progenitor",
            Compartment::Differentiated => "differentiated",
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instantaneous population sizes of the three compartments.
///
/// Counts are real-valued because they come out of a continuous SDE solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    pub stem: f64,
    pub progenitor: f64,
    pub differentiated: f64,
}

impl CompartmentState {
    /// Create a state from its three counts.
    pub const fn new(stem: f64, progenitor: f64, differentiated: f64) -> Self {
        Self {
            stem,
            progenitor,
            differentiated,
        }
    }

    /// Count for a single compartment.
    #[inline]
    pub fn get(&self, compartment: Compartment) -> f64 {
        match compartment {
            Compartment::Stem => self.stem,
            Compartment::Progenitor => self.progenitor,
            Compartment::Differentiated => self.differentiated,
        }
    }

    /// Counts in compartment order.
    #[inline]
    pub fn to_array(self) -> [f64; COMPARTMENTS] {
        [self.stem, self.progenitor, self.differentiated]
    }

    /// Sum over all compartments.
    pub fn total(&self) -> f64 {
        self.stem + self.progenitor + self.differentiated
    }

    /// Largest single compartment count.
    pub fn max_count(&self) -> f64 {
        self.stem.max(self.progenitor).max(self.differentiated)
    }

    /// True when every count is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|c| c.is_finite() && *c >= 0.0)
    }
}

impl From<[f64; COMPARTMENTS]> for CompartmentState {
    fn from(counts: [f64; COMPARTMENTS]) -> Self {
        Self::new(counts[0], counts[1], counts[2])
    }
}

impl Index<Compartment> for CompartmentState {
    type Output = f64;

    fn index(&self, compartment: Compartment) -> &Self::Output {
        match compartment {
            Compartment::Stem => &self.stem,
            Compartment::Progenitor => &self.progenitor,
            Compartment::Differentiated => &self.differentiated,
        }
    }
}

impl fmt::Display for CompartmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stem={:.2}, progenitor={:.2}, differentiated={:.2}",
            self.stem, self.progenitor, self.differentiated
        )
    }
}
