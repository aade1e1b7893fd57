//! Change gate for suppressing near-duplicate pose updates.
//!
//! Successive frames of a still head produce slightly different estimates.
//! Consumers only need to hear about a pose when it differs meaningfully
//! from the last one they were given.

use crate::{
    constants::{DEFAULT_GATE_CONFIDENCE, DEFAULT_GATE_ROLL, DEFAULT_GATE_YAW},
    pose_estimation::HeadPose,
};
use serde::{Deserialize, Serialize};

/// Per-axis change thresholds; `None` leaves an axis unchecked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    /// Yaw change in degrees
    pub yaw: Option<f64>,
    /// Pitch change in degrees
    pub pitch: Option<f64>,
    /// Roll change in degrees
    pub roll: Option<f64>,
    /// Confidence change
    pub confidence: Option<f64>,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            yaw: Some(DEFAULT_GATE_YAW),
            pitch: None,
            roll: Some(DEFAULT_GATE_ROLL),
            confidence: Some(DEFAULT_GATE_CONFIDENCE),
        }
    }
}

impl GateThresholds {
    /// Thresholds that let every pose through
    #[must_use]
    pub fn pass_all() -> Self {
        Self {
            yaw: Some(0.0),
            pitch: None,
            roll: None,
            confidence: None,
        }
    }

    fn exceeded(&self, previous: &HeadPose, current: &HeadPose) -> bool {
        let axes = [
            (self.yaw, previous.yaw, current.yaw),
            (self.pitch, previous.pitch, current.pitch),
            (self.roll, previous.roll, current.roll),
            (self.confidence, previous.confidence, current.confidence),
        ];
        axes.iter()
            .any(|&(threshold, a, b)| threshold.is_some_and(|t| (a - b).abs() >= t))
    }
}

/// Remembers the last published pose and filters out small changes
#[derive(Debug, Clone, Default)]
pub struct PoseChangeGate {
    thresholds: GateThresholds,
    last_published: Option<HeadPose>,
}

impl PoseChangeGate {
    /// Create a new gate
    #[must_use]
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            thresholds,
            last_published: None,
        }
    }

    /// Decide whether `pose` should be published, remembering it if so
    pub fn should_publish(&mut self, pose: &HeadPose) -> bool {
        let publish = match &self.last_published {
            None => true,
            Some(previous) => self.thresholds.exceeded(previous, pose),
        };
        if publish {
            self.last_published = Some(*pose);
        }
        publish
    }

    /// Last pose that passed the gate
    #[must_use]
    pub fn last_published(&self) -> Option<&HeadPose> {
        self.last_published.as_ref()
    }

    /// Forget the last published pose
    pub fn reset(&mut self) {
        self.last_published = None;
    }
}
