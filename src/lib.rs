//! Head pose heuristics and exercise compliance tracking for a virtual
//! physiotherapist.
//!
//! The library takes the output of a six-landmark face detector (eyes,
//! nose, mouth, ears plus a bounding box) and derives:
//! - head yaw, pitch and roll in degrees
//! - an estimated neck segment and neck tilt
//! - per-frame tracking with rate limiting and change suppression
//! - hold-timer based compliance for neck exercises
//!
//! # Examples
//!
//! ## Estimating a pose
//!
//! ```
//! use physio_pose::{estimate_head_pose, FaceDetection, Point2D};
//!
//! # fn main() -> physio_pose::Result<()> {
//! let face = FaceDetection::new(
//!     Point2D::new(50.0, 50.0),
//!     Point2D::new(150.0, 200.0),
//!     vec![
//!         Point2D::new(70.0, 100.0),  // right eye
//!         Point2D::new(130.0, 100.0), // left eye
//!         Point2D::new(100.0, 115.0), // nose
//!         Point2D::new(100.0, 140.0), // mouth
//!     ],
//!     0.9,
//! );
//!
//! let pose = estimate_head_pose(&face)?;
//! assert_eq!(pose.yaw, 0.0);
//! assert_eq!(pose.roll, 0.0);
//! assert!((pose.pitch + 10.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Tracking an exercise
//!
//! ```no_run
//! use physio_pose::{config::Config, exercise::ExerciseSession, tracker::PoseTracker};
//! use std::time::Instant;
//!
//! # fn main() -> physio_pose::Result<()> {
//! let config = Config::default();
//! let mut tracker = PoseTracker::from_config(&config)?;
//! let mut session = ExerciseSession::from_config(&config.exercise)?;
//! session.start();
//!
//! # let detections: Vec<physio_pose::FaceDetection> = Vec::new();
//! // for every camera frame:
//! let now = Instant::now();
//! if let Some(pose) = tracker.process_frame(&detections, now).pose() {
//!     let feedback = session.evaluate(pose, now);
//!     println!("{:?}", feedback);
//! }
//! # Ok(())
//! # }
//! ```

/// Face detection records and landmark indexing
pub mod landmarks;

/// Head pose estimation from face landmarks
pub mod pose_estimation;

/// Change gate for pose updates
pub mod pose_gate;

/// Minimum-interval rate limiting
pub mod throttle;

/// Per-frame tracking pipeline
pub mod tracker;

/// Exercise compliance state machine
pub mod exercise;

/// Error types and result handling
pub mod error;

/// Recording replay application
pub mod app;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
pub use landmarks::{FaceDetection, Landmark, Point2D};
pub use pose_estimation::{estimate_head_pose, HeadPose, HeadPoseEstimator, NeckPosition};
