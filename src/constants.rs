//! Constants used throughout the library

/// Number of landmarks the face detector reports per face
pub const NUM_FACE_LANDMARKS: usize = 6;

/// Landmarks required before any pose can be estimated (both eyes and nose)
pub const MIN_POSE_LANDMARKS: usize = 3;

/// Degrees of yaw for a nose offset equal to the eye distance
pub const DEFAULT_YAW_SCALE: f64 = 45.0;

/// Expected nose-to-mouth distance as a fraction of face height
pub const DEFAULT_NOSE_MOUTH_RATIO: f64 = 0.25;

/// Degrees of pitch per unit deviation from the expected nose-to-mouth ratio
pub const DEFAULT_PITCH_SCALE: f64 = 30.0;

/// Neck offsets below the mouth, in face heights
pub const DEFAULT_NECK_TOP_FROM_MOUTH: f64 = 0.5;
pub const DEFAULT_NECK_BOTTOM_FROM_MOUTH: f64 = 1.2;

/// Neck offsets below the nose when no mouth landmark exists, in face heights
pub const DEFAULT_NECK_TOP_FROM_NOSE: f64 = 0.7;
pub const DEFAULT_NECK_BOTTOM_FROM_NOSE: f64 = 1.4;

/// Fraction of head roll the neck is assumed to follow
pub const DEFAULT_NECK_TILT_FACTOR: f64 = 0.7;

/// Yaw beyond which the head counts as turned left or right
pub const HEAD_DIRECTION_YAW_LIMIT: f64 = 10.0;

/// Minimum detector confidence for a face to be tracked
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Minimum time between two detection passes
pub const DEFAULT_DETECTION_INTERVAL_MS: u64 = 100;

/// Pose change gate thresholds
pub const DEFAULT_GATE_YAW: f64 = 5.0;
pub const DEFAULT_GATE_ROLL: f64 = 5.0;
pub const DEFAULT_GATE_CONFIDENCE: f64 = 0.15;

/// Exercise defaults
pub const DEFAULT_HOLD_SECONDS: f64 = 5.0;
pub const DEFAULT_FEEDBACK_INTERVAL_MS: u64 = 300;
pub const DEFAULT_NEUTRAL_YAW_LIMIT: f64 = 10.0;
pub const DEFAULT_NEUTRAL_PITCH_LIMIT: f64 = 10.0;
pub const DEFAULT_TILT_THRESHOLD: f64 = 15.0;
