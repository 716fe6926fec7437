//! Projection of a trajectory onto a single time point and the discrete
//! status classification derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::base::{Compartment, CompartmentState, TimeGrid, Trajectory, COMPARTMENTS};
use crate::errors::{ConfigError, EngineError, EngineResult};

/// Discrete interpretation of the current population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLabel {
    Happy,
    Neutral,
    Sad,
}

impl StatusLabel {
    /// Lowercase identifier, used to build asset names.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusLabel::Happy => "happy",
            StatusLabel::Neutral => "neutral",
            StatusLabel::Sad => "sad",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Check if `value` lies inside the band (both ends included).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.low.is_nan() || self.high.is_nan() || self.low > self.high {
            return Err(ConfigError::InvalidSetting {
                field,
                reason: format!("band [{}, {}] is empty", self.low, self.high),
            });
        }
        Ok(())
    }
}

/// Threshold rules turning a state into a [`StatusLabel`].
///
/// Both variants report `Neutral` before `warmup`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum StatusRules {
    /// Happy / neutral / sad.
    ///
    /// Differentiated count outside `viable` is sad. Differentiated count
    /// inside `healthy` with a stem/differentiated ratio inside `ratio` is
    /// happy. Anything else is neutral.
    ThreeWay {
        warmup: f64,
        viable: Band,
        healthy: Band,
        ratio: Band,
    },
    /// Happy when the differentiated count is inside `healthy`, sad otherwise.
    Binary { warmup: f64, healthy: Band },
}

impl Default for StatusRules {
    fn default() -> Self {
        StatusRules::ThreeWay {
            warmup: 10.0,
            viable: Band::new(1000.0, 12000.0),
            healthy: Band::new(3000.0, 8000.0),
            ratio: Band::new(0.05, 0.5),
        }
    }
}

impl StatusRules {
    /// Time before which the status is always neutral.
    pub fn warmup(&self) -> f64 {
        match self {
            StatusRules::ThreeWay { warmup, .. } | StatusRules::Binary { warmup, .. } => *warmup,
        }
    }

    /// Classify `state` observed at `time`.
    pub fn classify(&self, state: &CompartmentState, time: f64) -> StatusLabel {
        if time < self.warmup() {
            return StatusLabel::Neutral;
        }

        let differentiated = state.differentiated;
        match self {
            StatusRules::ThreeWay {
                viable,
                healthy,
                ratio,
                ..
            } => {
                if !viable.contains(differentiated) {
                    return StatusLabel::Sad;
                }
                // A zero differentiated count has no meaningful ratio.
                let balanced = differentiated > 0.0 && ratio.contains(state.stem / differentiated);
                if healthy.contains(differentiated) && balanced {
                    StatusLabel::Happy
                } else {
                    StatusLabel::Neutral
                }
            }
            StatusRules::Binary { healthy, .. } => {
                if healthy.contains(differentiated) {
                    StatusLabel::Happy
                } else {
                    StatusLabel::Sad
                }
            }
        }
    }

    /// Check that every band is non-empty and the warm-up is finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.warmup().is_finite() {
            return Err(ConfigError::InvalidSetting {
                field: "status.warmup",
                reason: "warm-up must be finite".into(),
            });
        }
        match self {
            StatusRules::ThreeWay {
                viable,
                healthy,
                ratio,
                ..
            } => {
                viable.validate("status.viable")?;
                healthy.validate("status.healthy")?;
                ratio.validate("status.ratio")
            }
            StatusRules::Binary { healthy, .. } => healthy.validate("status.healthy"),
        }
    }
}

/// Discretization of counts into a number of visual markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerScale {
    pub cells_per_marker: f64,
    pub max_markers: usize,
}

impl Default for MarkerScale {
    fn default() -> Self {
        Self {
            cells_per_marker: 100.0,
            max_markers: 100,
        }
    }
}

impl MarkerScale {
    /// Marker count for one compartment count.
    pub fn markers_for(&self, count: f64) -> usize {
        let markers = (count.max(0.0) / self.cells_per_marker).round();
        if markers >= self.max_markers as f64 {
            self.max_markers
        } else {
            markers as usize
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.cells_per_marker.is_finite() || self.cells_per_marker <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                field: "display.markers.cells_per_marker",
                reason: format!("must be positive, got {}", self.cells_per_marker),
            });
        }
        Ok(())
    }
}

/// Presentation settings consumed by the projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Marker discretization
    #[serde(default)]
    pub markers: MarkerScale,
    /// Smallest y-axis upper bound shared by bar and line views
    pub y_axis_floor: f64,
    /// Prefix of status asset names
    pub asset_prefix: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            markers: MarkerScale::default(),
            y_axis_floor: 10_000.0,
            asset_prefix: "status".to_string(),
        }
    }
}

impl DisplayConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.markers.validate()?;
        if !self.y_axis_floor.is_finite() || self.y_axis_floor < 0.0 {
            return Err(ConfigError::InvalidSetting {
                field: "display.y_axis_floor",
                reason: format!("must be finite and non-negative, got {}", self.y_axis_floor),
            });
        }
        Ok(())
    }
}

/// Stateless view of trajectories at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct StateProjector {
    grid: TimeGrid,
    rules: StatusRules,
    display: DisplayConfig,
}

impl StateProjector {
    pub fn new(grid: TimeGrid, rules: StatusRules, display: DisplayConfig) -> Self {
        Self {
            grid,
            rules,
            display,
        }
    }

    /// Time grid the projector resolves query times against.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Active status rules.
    pub fn rules(&self) -> &StatusRules {
        &self.rules
    }

    /// Compartment counts at `time`, which must be a grid point.
    pub fn project(&self, trajectory: &Trajectory, time: f64) -> EngineResult<CompartmentState> {
        self.grid
            .index_of(time)
            .and_then(|index| trajectory.state_at(index))
            .ok_or(EngineError::TimeOutOfGrid {
                time,
                min: self.grid.time_min(),
                max: self.grid.time_max(),
                step: self.grid.time_step(),
            })
    }

    /// Status of `state` observed at `time`.
    pub fn status(&self, state: &CompartmentState, time: f64) -> StatusLabel {
        self.rules.classify(state, time)
    }

    /// Marker counts per compartment.
    pub fn markers(&self, state: &CompartmentState) -> [usize; COMPARTMENTS] {
        Compartment::ALL.map(|c| self.display.markers.markers_for(state[c]))
    }

    /// Asset name of a status: `"<prefix>_<label>"`.
    pub fn asset_name(&self, label: StatusLabel) -> String {
        format!("{}_{}", self.display.asset_prefix, label)
    }

    /// Shared y-axis upper bound for a trajectory.
    pub fn y_axis_max(&self, trajectory: &Trajectory) -> f64 {
        self.display.y_axis_floor.max(trajectory.max_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_trajectory(grid: &TimeGrid, state: CompartmentState) -> Trajectory {
        let samples = vec![state; grid.len()];
        Trajectory::from_samples(grid, &samples).unwrap()
    }

    fn projector() -> StateProjector {
        StateProjector::new(
            TimeGrid::default(),
            StatusRules::default(),
            DisplayConfig::default(),
        )
    }

    #[test]
    fn test_project_exact_and_off_grid() {
        let projector = projector();
        let state = CompartmentState::new(10.0, 20.0, 30.0);
        let trajectory = flat_trajectory(projector.grid(), state);

        assert_eq!(projector.project(&trajectory, 50.0).unwrap(), state);
        assert!(matches!(
            projector.project(&trajectory, 50.05),
            Err(EngineError::TimeOutOfGrid { .. })
        ));
        assert!(matches!(
            projector.project(&trajectory, 100.1),
            Err(EngineError::TimeOutOfGrid { .. })
        ));
    }

    #[test]
    fn test_warmup_is_neutral() {
        let rules = StatusRules::default();
        let healthy = CompartmentState::new(1000.0, 2500.0, 4950.0);
        let collapsed = CompartmentState::new(0.0, 0.0, 0.0);
        assert_eq!(rules.classify(&healthy, 5.0), StatusLabel::Neutral);
        assert_eq!(rules.classify(&collapsed, 9.9), StatusLabel::Neutral);
    }

    #[test]
    fn test_three_way_bands() {
        let rules = StatusRules::default();
        let at = |s: f64, d: f64| rules.classify(&CompartmentState::new(s, 0.0, d), 50.0);

        assert_eq!(at(1000.0, 4950.0), StatusLabel::Happy);
        // Healthy count but too many stem cells per differentiated cell
        assert_eq!(at(4000.0, 4950.0), StatusLabel::Neutral);
        // Viable but below the healthy band
        assert_eq!(at(200.0, 2000.0), StatusLabel::Neutral);
        assert_eq!(at(200.0, 500.0), StatusLabel::Sad);
        assert_eq!(at(1000.0, 20000.0), StatusLabel::Sad);
        // Band edges are inclusive
        assert_eq!(at(300.0, 3000.0), StatusLabel::Happy);
    }

    #[test]
    fn test_zero_differentiated_is_not_happy() {
        let rules = StatusRules::ThreeWay {
            warmup: 0.0,
            viable: Band::new(0.0, 100.0),
            healthy: Band::new(0.0, 100.0),
            ratio: Band::new(0.0, 1.0),
        };
        let label = rules.classify(&CompartmentState::new(10.0, 0.0, 0.0), 1.0);
        assert_eq!(label, StatusLabel::Neutral);
    }

    #[test]
    fn test_binary_rules() {
        let rules = StatusRules::Binary {
            warmup: 20.0,
            healthy: Band::new(3000.0, 8000.0),
        };
        let good = CompartmentState::new(1000.0, 2500.0, 4950.0);
        let bad = CompartmentState::new(1000.0, 2500.0, 9000.0);
        assert_eq!(rules.classify(&good, 10.0), StatusLabel::Neutral);
        assert_eq!(rules.classify(&good, 20.0), StatusLabel::Happy);
        assert_eq!(rules.classify(&bad, 20.0), StatusLabel::Sad);
    }

    #[test]
    fn test_status_is_pure() {
        let projector = projector();
        let state = CompartmentState::new(900.0, 2400.0, 4800.0);
        let first = projector.status(&state, 60.0);
        for _ in 0..10 {
            assert_eq!(projector.status(&state, 60.0), first);
        }
    }

    #[test]
    fn test_markers() {
        let projector = projector();
        let markers = projector.markers(&CompartmentState::new(1000.0, 149.0, 50_000.0));
        assert_eq!(markers, [10, 1, 100]);
        assert_eq!(MarkerScale::default().markers_for(-3.0), 0);
    }

    #[test]
    fn test_asset_name() {
        assert_eq!(projector().asset_name(StatusLabel::Sad), "status_sad");
    }

    #[test]
    fn test_y_axis_floor() {
        let projector = projector();
        let low = flat_trajectory(projector.grid(), CompartmentState::new(1.0, 2.0, 3.0));
        assert_eq!(projector.y_axis_max(&low), 10_000.0);

        let high = flat_trajectory(projector.grid(), CompartmentState::new(1.0, 20_000.0, 3.0));
        assert_eq!(projector.y_axis_max(&high), 20_000.0);
    }

    #[test]
    fn test_rules_validation() {
        assert!(StatusRules::default().validate().is_ok());
        let rules = StatusRules::Binary {
            warmup: 0.0,
            healthy: Band::new(5.0, 1.0),
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rules_serde_tag() {
        let json = serde_json::to_string(&StatusRules::default()).unwrap();
        assert!(json.contains("\"variant\":\"three_way\""));
        let back: StatusRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StatusRules::default());
    }
}
