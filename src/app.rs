//! Replay application: runs recorded face detections through the tracker
//! and, optionally, an exercise session.

use crate::{
    config::Config,
    error::Result,
    exercise::{ExerciseSession, Feedback},
    landmarks::FaceDetection,
    pose_estimation::HeadPose,
    throttle::Throttle,
    tracker::{FrameOutcome, PoseTracker},
    Error,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// One frame of recorded detector output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Capture time relative to the start of the recording
    pub timestamp_ms: u64,
    /// Faces reported by the detector, strongest first
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
}

/// A recorded session of detector output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Load a recording from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a recording from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Parse(format!("Failed to parse recording: {}", e)))
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Tracker and exercise settings
    pub config: Config,
    /// Run the exercise routine against the tracked poses
    pub run_exercises: bool,
}

/// Something worth reporting during a replay
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    /// The tracker published a new pose
    Pose { timestamp_ms: u64, pose: HeadPose },
    /// The exercise session produced feedback
    Feedback { timestamp_ms: u64, feedback: Feedback },
}

/// Totals for one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub poses_published: usize,
    pub frames_rejected: usize,
    pub frames_without_face: usize,
    pub exercises_completed: usize,
    pub session_complete: bool,
}

/// Main application struct
pub struct PhysioPoseApp {
    tracker: PoseTracker,
    session: Option<ExerciseSession>,
    feedback_throttle: Throttle,
}

impl PhysioPoseApp {
    /// Create a new replay application
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing physio pose replay");
        config.config.validate()?;

        let tracker = PoseTracker::from_config(&config.config)?;
        let session = if config.run_exercises {
            let mut session = ExerciseSession::from_config(&config.config.exercise)?;
            session.start();
            Some(session)
        } else {
            None
        };

        Ok(Self {
            tracker,
            session,
            feedback_throttle: Throttle::from_millis(config.config.exercise.feedback_interval_ms),
        })
    }

    /// Replay every frame, reporting events to `on_event`
    ///
    /// The exercise session is evaluated only on frames where a pose was
    /// estimated; frames without a usable face leave the hold timer alone.
    pub fn replay<F: FnMut(&ReplayEvent)>(&mut self, recording: &Recording, mut on_event: F) -> ReplaySummary {
        info!("Replaying {} frames", recording.frames.len());
        let origin = Instant::now();
        let mut last_timestamp = 0;

        for frame in &recording.frames {
            if frame.timestamp_ms < last_timestamp {
                warn!(
                    "Frame at {} ms is older than the previous frame at {} ms",
                    frame.timestamp_ms, last_timestamp
                );
            }
            last_timestamp = frame.timestamp_ms;
            let now = origin + Duration::from_millis(frame.timestamp_ms);

            let outcome = self.tracker.process_frame(&frame.faces, now);
            if let FrameOutcome::Updated(pose) = &outcome {
                on_event(&ReplayEvent::Pose {
                    timestamp_ms: frame.timestamp_ms,
                    pose: *pose,
                });
            }

            if !matches!(outcome, FrameOutcome::Updated(_) | FrameOutcome::Unchanged) {
                continue;
            }
            let (Some(session), Some(pose)) = (self.session.as_mut(), self.tracker.last_pose()) else {
                continue;
            };
            if !self.feedback_throttle.ready(now) {
                continue;
            }
            let feedback = session.evaluate(pose, now);
            if feedback != Feedback::Idle {
                on_event(&ReplayEvent::Feedback {
                    timestamp_ms: frame.timestamp_ms,
                    feedback,
                });
            }
        }

        let stats = self.tracker.stats();
        let summary = ReplaySummary {
            frames: stats.frames,
            poses_published: stats.updated,
            frames_rejected: stats.rejected,
            frames_without_face: stats.no_face,
            exercises_completed: self.session.as_ref().map_or(0, ExerciseSession::completed_count),
            session_complete: self.session.as_ref().is_some_and(ExerciseSession::is_complete),
        };
        info!("Replay finished: {:?}", summary);
        summary
    }

    /// Exercise session, if one is running
    #[must_use]
    pub fn session(&self) -> Option<&ExerciseSession> {
        self.session.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Point2D;

    /// Face with the eye line rotated so the right eye sits `drop` px lower
    fn face(drop: f64) -> FaceDetection {
        FaceDetection::new(
            Point2D::new(50.0, 50.0),
            Point2D::new(150.0, 200.0),
            vec![
                Point2D::new(70.0, 100.0 + drop),
                Point2D::new(130.0, 100.0),
                Point2D::new(100.0, 115.0),
                Point2D::new(100.0, 144.0),
            ],
            0.9,
        )
    }

    fn recording(segments: &[(f64, u64)]) -> Recording {
        let mut frames = Vec::new();
        let mut t = 0;
        for &(drop, duration_ms) in segments {
            let end = t + duration_ms;
            while t < end {
                frames.push(RecordedFrame {
                    timestamp_ms: t,
                    faces: vec![face(drop)],
                });
                t += 100;
            }
        }
        Recording { frames }
    }

    #[test]
    fn test_replay_publishes_poses() {
        let mut app = PhysioPoseApp::new(AppConfig::default()).unwrap();
        let mut poses = 0;
        let summary = app.replay(&recording(&[(0.0, 1000)]), |event| {
            if matches!(event, ReplayEvent::Pose { .. }) {
                poses += 1;
            }
        });
        assert_eq!(summary.frames, 10);
        assert_eq!(poses, 1);
        assert_eq!(summary.poses_published, 1);
        assert!(app.session().is_none());
    }

    #[test]
    fn test_replay_full_routine() {
        let config = AppConfig {
            run_exercises: true,
            ..AppConfig::default()
        };
        let mut app = PhysioPoseApp::new(config).unwrap();

        // level, then right eye high (left tilt), then right eye low (right tilt)
        let rec = recording(&[(0.0, 6000), (-30.0, 6000), (30.0, 6000)]);
        let mut feedback = Vec::new();
        let summary = app.replay(&rec, |event| {
            if let ReplayEvent::Feedback { feedback: f, .. } = event {
                feedback.push(f.clone());
            }
        });

        assert!(summary.session_complete);
        assert_eq!(summary.exercises_completed, 3);
        assert_eq!(feedback.last(), Some(&Feedback::SessionCompleted));
    }

    #[test]
    fn test_recording_yaml() {
        let yaml = r"
frames:
  - timestamp_ms: 0
    faces:
      - topLeft: [50, 50]
        bottomRight: [150, 200]
        landmarks: [[70, 100], [130, 100], [100, 115], [100, 140]]
        probability: 0.9
  - timestamp_ms: 100
";
        let rec = Recording::from_yaml(yaml).unwrap();
        assert_eq!(rec.frames.len(), 2);
        assert!(rec.frames[1].faces.is_empty());

        assert!(matches!(Recording::from_yaml("frames: 3"), Err(Error::Parse(_))));
    }
}
