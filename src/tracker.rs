//! Per-frame head tracking pipeline.
//!
//! Each frame's detections pass through, in order: the detection throttle,
//! primary face selection, pose estimation and the change gate. A frame
//! that fails any step leaves the last published pose in place.

use crate::{
    config::Config,
    landmarks::{select_primary_face, FaceDetection},
    pose_estimation::{HeadPose, HeadPoseEstimator},
    pose_gate::{GateThresholds, PoseChangeGate},
    throttle::Throttle,
    Result,
};
use log::{debug, info, trace, warn};
use std::time::Instant;

/// What happened to one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Arrived before the detection interval elapsed; not processed
    Throttled,
    /// No face reached the confidence threshold
    NoFace,
    /// A face was found but no pose could be estimated
    Rejected(String),
    /// Estimated pose was too close to the last published one
    Unchanged,
    /// New pose published
    Updated(HeadPose),
}

impl FrameOutcome {
    /// Pose published by this frame, if any
    #[must_use]
    pub fn pose(&self) -> Option<&HeadPose> {
        match self {
            Self::Updated(pose) => Some(pose),
            _ => None,
        }
    }
}

/// Running counters over processed frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub frames: usize,
    pub throttled: usize,
    pub no_face: usize,
    pub rejected: usize,
    pub unchanged: usize,
    pub updated: usize,
}

/// Stateful wrapper around [`HeadPoseEstimator`] for a stream of frames
#[derive(Debug, Clone)]
pub struct PoseTracker {
    estimator: HeadPoseEstimator,
    gate: PoseChangeGate,
    throttle: Throttle,
    min_confidence: f64,
    stats: TrackerStats,
}

impl PoseTracker {
    /// Create a tracker from its parts
    #[must_use]
    pub fn new(estimator: HeadPoseEstimator, thresholds: GateThresholds, throttle: Throttle, min_confidence: f64) -> Self {
        Self {
            estimator,
            gate: PoseChangeGate::new(thresholds),
            throttle,
            min_confidence,
            stats: TrackerStats::default(),
        }
    }

    /// Create a tracker from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the estimator coefficients are invalid
    pub fn from_config(config: &Config) -> Result<Self> {
        let estimator = HeadPoseEstimator::with_coefficients(config.estimator)?;
        let throttle = Throttle::from_millis(config.detection.detection_interval_ms);
        info!(
            "Tracking faces above {:.2} confidence every {:?}",
            config.detection.min_confidence,
            throttle.min_interval()
        );
        Ok(Self::new(estimator, config.gate, throttle, config.detection.min_confidence))
    }

    /// Process one frame's detections
    pub fn process_frame(&mut self, faces: &[FaceDetection], now: Instant) -> FrameOutcome {
        self.stats.frames += 1;

        if !self.throttle.ready(now) {
            trace!("Frame throttled");
            self.stats.throttled += 1;
            return FrameOutcome::Throttled;
        }

        let Some(face) = select_primary_face(faces, self.min_confidence) else {
            debug!("No face detected in {} detections", faces.len());
            self.stats.no_face += 1;
            return FrameOutcome::NoFace;
        };

        let pose = match self.estimator.estimate(face) {
            Ok(pose) => pose,
            Err(e) => {
                if e.is_per_frame() {
                    debug!("Skipping frame: {}", e);
                } else {
                    warn!("Pose estimation failed: {}", e);
                }
                self.stats.rejected += 1;
                return FrameOutcome::Rejected(e.to_string());
            }
        };

        if self.gate.should_publish(&pose) {
            debug!(
                "Pose updated: yaw {:.1}, pitch {:.1}, roll {:.1}",
                pose.yaw, pose.pitch, pose.roll
            );
            self.stats.updated += 1;
            FrameOutcome::Updated(pose)
        } else {
            trace!("Pose unchanged");
            self.stats.unchanged += 1;
            FrameOutcome::Unchanged
        }
    }

    /// Most recent published pose
    #[must_use]
    pub fn last_pose(&self) -> Option<&HeadPose> {
        self.gate.last_published()
    }

    /// Counters since creation or the last reset
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Forget the last pose, the throttle state and the counters
    pub fn reset(&mut self) {
        self.gate.reset();
        self.throttle.reset();
        self.stats = TrackerStats::default();
    }
}
