//! Head pose estimation from six-point face landmarks.
//!
//! The detector only gives 2D eye, nose and mouth positions, so the angles
//! here are geometric heuristics rather than a full 3D solve:
//!
//! - yaw from the nose offset relative to the eye midpoint
//! - roll from the slope of the eye line
//! - pitch from the nose-to-mouth distance relative to face height
//!
//! Neck position and tilt are extrapolated from the face.

use crate::{
    constants::{
        DEFAULT_NECK_BOTTOM_FROM_MOUTH, DEFAULT_NECK_BOTTOM_FROM_NOSE, DEFAULT_NECK_TILT_FACTOR,
        DEFAULT_NECK_TOP_FROM_MOUTH, DEFAULT_NECK_TOP_FROM_NOSE, DEFAULT_NOSE_MOUTH_RATIO, DEFAULT_PITCH_SCALE,
        DEFAULT_YAW_SCALE, HEAD_DIRECTION_YAW_LIMIT, MIN_POSE_LANDMARKS,
    },
    landmarks::{FaceDetection, Landmark, Point2D},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Estimated neck segment in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeckPosition {
    /// Upper end of the neck, just below the chin
    pub top: Point2D,
    /// Lower end of the neck
    pub bottom: Point2D,
}

/// Head orientation for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadPose {
    /// Left/right rotation in degrees; positive when the nose is right of the eye midpoint
    pub yaw: f64,
    /// Up/down rotation in degrees; zero when no mouth landmark was available
    pub pitch: f64,
    /// Ear-to-shoulder tilt in degrees; positive when the right eye is lower
    pub roll: f64,
    /// Neck tilt in degrees, following roll at reduced magnitude
    pub neck_tilt: f64,
    /// Estimated neck segment
    pub neck_position: NeckPosition,
    /// Detector confidence, passed through unchanged
    pub confidence: f64,
}

/// Coarse left/right classification of a pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadDirection {
    Left,
    Neutral,
    Right,
}

impl std::fmt::Display for HeadDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Left => "Left",
            Self::Neutral => "Neutral",
            Self::Right => "Right",
        };
        f.write_str(name)
    }
}

impl HeadPose {
    /// Which way the head is turned
    #[must_use]
    pub fn direction(&self) -> HeadDirection {
        if self.yaw < -HEAD_DIRECTION_YAW_LIMIT {
            HeadDirection::Left
        } else if self.yaw > HEAD_DIRECTION_YAW_LIMIT {
            HeadDirection::Right
        } else {
            HeadDirection::Neutral
        }
    }
}

/// Tunable coefficients of the pose heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseCoefficients {
    /// Degrees of yaw for a nose offset of one eye distance
    pub yaw_scale: f64,
    /// Expected nose-to-mouth distance as a fraction of face height
    pub nose_mouth_ratio: f64,
    /// Degrees of pitch per unit deviation from the expected ratio
    pub pitch_scale: f64,
    /// Neck top below the mouth, in face heights
    pub neck_top_from_mouth: f64,
    /// Neck bottom below the mouth, in face heights
    pub neck_bottom_from_mouth: f64,
    /// Neck top below the nose when the mouth is missing, in face heights
    pub neck_top_from_nose: f64,
    /// Neck bottom below the nose when the mouth is missing, in face heights
    pub neck_bottom_from_nose: f64,
    /// Fraction of roll applied to the neck
    pub neck_tilt_factor: f64,
}

impl Default for PoseCoefficients {
    fn default() -> Self {
        Self {
            yaw_scale: DEFAULT_YAW_SCALE,
            nose_mouth_ratio: DEFAULT_NOSE_MOUTH_RATIO,
            pitch_scale: DEFAULT_PITCH_SCALE,
            neck_top_from_mouth: DEFAULT_NECK_TOP_FROM_MOUTH,
            neck_bottom_from_mouth: DEFAULT_NECK_BOTTOM_FROM_MOUTH,
            neck_top_from_nose: DEFAULT_NECK_TOP_FROM_NOSE,
            neck_bottom_from_nose: DEFAULT_NECK_BOTTOM_FROM_NOSE,
            neck_tilt_factor: DEFAULT_NECK_TILT_FACTOR,
        }
    }
}

impl PoseCoefficients {
    /// Check that every coefficient is usable
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if a coefficient is non-finite or one of
    /// the yaw, pitch and nose-mouth scales is not positive
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("yaw_scale", self.yaw_scale),
            ("nose_mouth_ratio", self.nose_mouth_ratio),
            ("pitch_scale", self.pitch_scale),
            ("neck_top_from_mouth", self.neck_top_from_mouth),
            ("neck_bottom_from_mouth", self.neck_bottom_from_mouth),
            ("neck_top_from_nose", self.neck_top_from_nose),
            ("neck_bottom_from_nose", self.neck_bottom_from_nose),
            ("neck_tilt_factor", self.neck_tilt_factor),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::ConfigError(format!("Coefficient {name} must be finite")));
        }
        let scales = [
            ("yaw_scale", self.yaw_scale),
            ("nose_mouth_ratio", self.nose_mouth_ratio),
            ("pitch_scale", self.pitch_scale),
        ];
        if let Some((name, _)) = scales.iter().find(|(_, v)| *v <= 0.0) {
            return Err(Error::ConfigError(format!("{name} must be greater than 0")));
        }
        Ok(())
    }
}

/// Landmark-based head pose estimator
///
/// Stateless apart from its coefficients; one estimator can serve any
/// number of frames and threads.
#[derive(Debug, Clone, Default)]
pub struct HeadPoseEstimator {
    coefficients: PoseCoefficients,
}

impl HeadPoseEstimator {
    /// Create an estimator with the default coefficients
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom coefficients
    ///
    /// # Errors
    ///
    /// Returns an error if the coefficients fail validation
    pub fn with_coefficients(coefficients: PoseCoefficients) -> Result<Self> {
        coefficients.validate()?;
        log::info!("Initializing HeadPoseEstimator with {:?}", coefficients);
        Ok(Self { coefficients })
    }

    /// Coefficients in use
    #[must_use]
    pub fn coefficients(&self) -> &PoseCoefficients {
        &self.coefficients
    }

    /// Estimate head pose for one detected face
    ///
    /// # Errors
    ///
    /// Both errors are per-frame: the caller should skip the frame.
    /// - `Error::InsufficientData` if fewer than three landmarks are present
    /// - `Error::NumericDegeneracy` if the eyes share an x coordinate, the
    ///   bounding box has no area, or any used coordinate is not finite
    pub fn estimate(&self, face: &FaceDetection) -> Result<HeadPose> {
        if face.landmarks.len() < MIN_POSE_LANDMARKS {
            return Err(Error::InsufficientData {
                required: MIN_POSE_LANDMARKS,
                found: face.landmarks.len(),
            });
        }

        let right_eye = face.landmarks[Landmark::RightEye.index()];
        let left_eye = face.landmarks[Landmark::LeftEye.index()];
        let nose = face.landmarks[Landmark::Nose.index()];
        let mouth = face.landmark(Landmark::Mouth);

        let used = [Some(face.top_left), Some(face.bottom_right), Some(right_eye), Some(left_eye), Some(nose), mouth];
        if !used.iter().flatten().all(Point2D::is_finite) {
            return Err(Error::NumericDegeneracy("non-finite coordinate".to_string()));
        }
        if !face.probability.is_finite() {
            return Err(Error::NumericDegeneracy("non-finite confidence".to_string()));
        }

        let width = face.width();
        let height = face.height();
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::NumericDegeneracy(format!(
                "bounding box has no area ({width} x {height})"
            )));
        }

        let eye_distance = (left_eye.x - right_eye.x).abs();
        if eye_distance == 0.0 {
            return Err(Error::NumericDegeneracy("eyes share an x coordinate".to_string()));
        }

        let c = &self.coefficients;

        let eye_midpoint_x = (left_eye.x + right_eye.x) / 2.0;
        let yaw = ((nose.x - eye_midpoint_x) / eye_distance) * c.yaw_scale;

        let roll = Self::eye_line_roll(right_eye, left_eye);

        let pitch = match mouth {
            Some(mouth) => {
                let nose_to_mouth = mouth.y - nose.y;
                let expected = height * c.nose_mouth_ratio;
                ((nose_to_mouth / expected) - 1.0) * c.pitch_scale
            }
            None => 0.0,
        };

        let neck_position = match mouth {
            Some(mouth) => NeckPosition {
                top: mouth.below(height * c.neck_top_from_mouth),
                bottom: mouth.below(height * c.neck_bottom_from_mouth),
            },
            None => NeckPosition {
                top: nose.below(height * c.neck_top_from_nose),
                bottom: nose.below(height * c.neck_bottom_from_nose),
            },
        };

        let pose = HeadPose {
            yaw,
            pitch,
            roll,
            neck_tilt: roll * c.neck_tilt_factor,
            neck_position,
            confidence: face.probability,
        };

        // Large but finite inputs can still overflow the arithmetic above
        let outputs = [pose.yaw, pose.pitch, pose.roll, pose.neck_tilt];
        if !outputs.iter().all(|v| v.is_finite())
            || !pose.neck_position.top.is_finite()
            || !pose.neck_position.bottom.is_finite()
        {
            return Err(Error::NumericDegeneracy("estimate overflowed".to_string()));
        }

        Ok(pose)
    }

    /// Estimate, mapping every per-frame failure to `None`
    #[must_use]
    pub fn try_estimate(&self, face: &FaceDetection) -> Option<HeadPose> {
        match self.estimate(face) {
            Ok(pose) => Some(pose),
            Err(e) => {
                log::trace!("No pose for frame: {}", e);
                None
            }
        }
    }

    /// Roll in degrees from the eye line.
    ///
    /// Measured against the horizontal eye separation, so level eyes give 0
    /// whichever side the detector puts the right eye, and a lower right eye
    /// is always positive.
    fn eye_line_roll(right_eye: Point2D, left_eye: Point2D) -> f64 {
        let delta_y = right_eye.y - left_eye.y;
        let delta_x = right_eye.x - left_eye.x;
        delta_y.atan2(delta_x.abs()).to_degrees()
    }
}

/// Estimate head pose with the default coefficients
///
/// # Errors
///
/// See [`HeadPoseEstimator::estimate`]
pub fn estimate_head_pose(face: &FaceDetection) -> Result<HeadPose> {
    HeadPoseEstimator::new().estimate(face)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(landmarks: &[(f64, f64)]) -> FaceDetection {
        FaceDetection::new(
            Point2D::new(50.0, 50.0),
            Point2D::new(150.0, 200.0),
            landmarks.iter().copied().map(Point2D::from).collect(),
            0.9,
        )
    }

    #[test]
    fn test_reference_face() {
        let pose = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0), (100.0, 115.0), (100.0, 140.0)])).unwrap();

        assert_eq!(pose.yaw, 0.0);
        assert_eq!(pose.roll, 0.0);
        assert!((pose.pitch - (-10.0)).abs() < 1e-9);
        assert_eq!(pose.neck_position.top, Point2D::new(100.0, 215.0));
        assert_eq!(pose.neck_position.bottom.x, 100.0);
        assert!((pose.neck_position.bottom.y - 320.0).abs() < 1e-9);
        assert_eq!(pose.neck_tilt, 0.0);
        assert_eq!(pose.confidence, 0.9);
    }

    #[test]
    fn test_yaw_scales_with_nose_offset() {
        // nose a full eye distance right of the midpoint
        let pose = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0), (160.0, 115.0)])).unwrap();
        assert!((pose.yaw - 45.0).abs() < 1e-9);

        let pose = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0), (85.0, 115.0)])).unwrap();
        assert!((pose.yaw - (-11.25)).abs() < 1e-9);
    }

    #[test]
    fn test_roll_sign() {
        let lower_right = estimate_head_pose(&face(&[(0.0, 10.0), (100.0, 0.0), (50.0, 20.0)])).unwrap();
        assert!(lower_right.roll > 0.0);
        assert!((lower_right.roll - 0.1_f64.atan().to_degrees()).abs() < 1e-9);

        let lower_left = estimate_head_pose(&face(&[(0.0, 0.0), (100.0, 10.0), (50.0, 20.0)])).unwrap();
        assert!(lower_left.roll < 0.0);
    }

    #[test]
    fn test_roll_independent_of_eye_order() {
        let normal = estimate_head_pose(&face(&[(0.0, 10.0), (100.0, 0.0), (50.0, 20.0)])).unwrap();
        let swapped_x = estimate_head_pose(&face(&[(100.0, 10.0), (0.0, 0.0), (50.0, 20.0)])).unwrap();
        assert_eq!(normal.roll, swapped_x.roll);
    }

    #[test]
    fn test_nose_fallback_neck() {
        let pose = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0), (100.0, 115.0)])).unwrap();
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(pose.neck_position.top.x, 100.0);
        assert!((pose.neck_position.top.y - 220.0).abs() < 1e-9);
        assert_eq!(pose.neck_position.bottom.x, 100.0);
        assert!((pose.neck_position.bottom.y - 325.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_landmarks() {
        let err = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0)])).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { required: 3, found: 2 }));
        assert!(err.is_per_frame());
    }

    #[test]
    fn test_zero_eye_distance() {
        let err = estimate_head_pose(&face(&[(100.0, 90.0), (100.0, 110.0), (100.0, 115.0)])).unwrap_err();
        assert!(matches!(err, Error::NumericDegeneracy(_)));
    }

    #[test]
    fn test_degenerate_box() {
        let mut f = face(&[(70.0, 100.0), (130.0, 100.0), (100.0, 115.0), (100.0, 140.0)]);
        f.bottom_right.y = f.top_left.y;
        assert!(matches!(estimate_head_pose(&f), Err(Error::NumericDegeneracy(_))));

        f.bottom_right = Point2D::new(40.0, 200.0);
        assert!(matches!(estimate_head_pose(&f), Err(Error::NumericDegeneracy(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let f = face(&[(70.0, f64::NAN), (130.0, 100.0), (100.0, 115.0)]);
        assert!(HeadPoseEstimator::new().try_estimate(&f).is_none());
    }

    #[test]
    fn test_custom_coefficients() {
        let coefficients = PoseCoefficients {
            neck_tilt_factor: 1.0,
            ..PoseCoefficients::default()
        };
        let estimator = HeadPoseEstimator::with_coefficients(coefficients).unwrap();
        assert_eq!(estimator.coefficients(), &coefficients);
        let pose = estimator.estimate(&face(&[(0.0, 10.0), (100.0, 0.0), (50.0, 20.0)])).unwrap();
        assert_eq!(pose.neck_tilt, pose.roll);

        let bad = PoseCoefficients {
            nose_mouth_ratio: 0.0,
            ..PoseCoefficients::default()
        };
        assert!(HeadPoseEstimator::with_coefficients(bad).is_err());
    }

    #[test]
    fn test_scales_must_be_positive() {
        // a flipped yaw scale would report a right turn as a left one
        for bad in [
            PoseCoefficients {
                yaw_scale: -45.0,
                ..PoseCoefficients::default()
            },
            PoseCoefficients {
                yaw_scale: 0.0,
                ..PoseCoefficients::default()
            },
            PoseCoefficients {
                pitch_scale: 0.0,
                ..PoseCoefficients::default()
            },
            PoseCoefficients {
                pitch_scale: -30.0,
                ..PoseCoefficients::default()
            },
        ] {
            assert!(matches!(bad.validate(), Err(Error::ConfigError(_))));
            assert!(HeadPoseEstimator::with_coefficients(bad).is_err());
        }
    }

    #[test]
    fn test_direction() {
        let mut pose = estimate_head_pose(&face(&[(70.0, 100.0), (130.0, 100.0), (100.0, 115.0)])).unwrap();
        assert_eq!(pose.direction(), HeadDirection::Neutral);
        pose.yaw = -12.0;
        assert_eq!(pose.direction(), HeadDirection::Left);
        pose.yaw = 10.5;
        assert_eq!(pose.direction(), HeadDirection::Right);
        assert_eq!(HeadDirection::Right.to_string(), "Right");
    }
}
