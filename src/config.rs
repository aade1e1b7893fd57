//! Configuration management for pose tracking and exercise sessions

use crate::{
    constants::{
        DEFAULT_DETECTION_INTERVAL_MS, DEFAULT_FEEDBACK_INTERVAL_MS, DEFAULT_HOLD_SECONDS, DEFAULT_MIN_CONFIDENCE,
        DEFAULT_NEUTRAL_PITCH_LIMIT, DEFAULT_NEUTRAL_YAW_LIMIT, DEFAULT_TILT_THRESHOLD,
    },
    exercise::ExerciseKind,
    pose_estimation::PoseCoefficients,
    pose_gate::GateThresholds,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose heuristic coefficients
    pub estimator: PoseCoefficients,

    /// Face selection and detection rate
    pub detection: DetectionConfig,

    /// Pose change gate thresholds
    pub gate: GateThresholds,

    /// Exercise session settings
    pub exercise: ExerciseConfig,
}

/// Face selection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum detector confidence for a face to be tracked (0.0-1.0)
    pub min_confidence: f64,

    /// Minimum time between processed frames
    pub detection_interval_ms: u64,
}

/// Exercise session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseConfig {
    /// Exercises in the order they are performed
    pub routine: Vec<ExerciseKind>,

    /// Seconds each pose must be held
    pub hold_seconds: f64,

    /// Minimum time between two evaluations
    pub feedback_interval_ms: u64,

    /// Largest |yaw| accepted as facing the camera
    pub neutral_yaw_limit: f64,

    /// Largest |pitch| accepted as a level head
    pub neutral_pitch_limit: f64,

    /// Roll a tilt exercise must exceed
    pub tilt_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            detection_interval_ms: DEFAULT_DETECTION_INTERVAL_MS,
        }
    }
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            routine: vec![ExerciseKind::StandStraight, ExerciseKind::TiltLeft, ExerciseKind::TiltRight],
            hold_seconds: DEFAULT_HOLD_SECONDS,
            feedback_interval_ms: DEFAULT_FEEDBACK_INTERVAL_MS,
            neutral_yaw_limit: DEFAULT_NEUTRAL_YAW_LIMIT,
            neutral_pitch_limit: DEFAULT_NEUTRAL_PITCH_LIMIT,
            tilt_threshold: DEFAULT_TILT_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;

        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.detection.detection_interval_ms == 0 {
            return Err(Error::ConfigError(
                "Detection interval must be greater than 0".to_string(),
            ));
        }

        let gate = [self.gate.yaw, self.gate.pitch, self.gate.roll, self.gate.confidence];
        if gate.iter().flatten().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(Error::ConfigError(
                "Gate thresholds must be finite and not negative".to_string(),
            ));
        }

        let exercise = &self.exercise;
        if exercise.routine.is_empty() {
            return Err(Error::ConfigError("Exercise routine must not be empty".to_string()));
        }
        if !exercise.hold_seconds.is_finite() || exercise.hold_seconds <= 0.0 {
            return Err(Error::ConfigError("Hold time must be greater than 0".to_string()));
        }
        if exercise.feedback_interval_ms == 0 {
            return Err(Error::ConfigError(
                "Feedback interval must be greater than 0".to_string(),
            ));
        }
        let limits = [exercise.neutral_yaw_limit, exercise.neutral_pitch_limit, exercise.tilt_threshold];
        if limits.iter().any(|l| !l.is_finite() || *l <= 0.0) {
            return Err(Error::ConfigError(
                "Exercise limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Physio Pose Configuration

# Pose heuristics
estimator:
  yaw_scale: 45.0
  nose_mouth_ratio: 0.25
  pitch_scale: 30.0
  neck_top_from_mouth: 0.5
  neck_bottom_from_mouth: 1.2
  neck_top_from_nose: 0.7
  neck_bottom_from_nose: 1.4
  neck_tilt_factor: 0.7

# Face selection
detection:
  min_confidence: 0.5
  detection_interval_ms: 100

# Only publish poses that moved at least this much (omit an axis to ignore it)
gate:
  yaw: 5.0
  roll: 5.0
  confidence: 0.15

# Exercise session
exercise:
  routine: [stand_straight, tilt_left, tilt_right]
  hold_seconds: 5.0
  feedback_interval_ms: 300
  neutral_yaw_limit: 10.0
  neutral_pitch_limit: 10.0
  tilt_threshold: 15.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(config.estimator, defaults.estimator);
        assert_eq!(config.gate, defaults.gate);
        assert_eq!(config.detection.detection_interval_ms, 100);
        assert_eq!(config.exercise.routine, defaults.exercise.routine);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_yaml("detection:\n  min_confidence: 0.8\n").unwrap();
        assert_eq!(config.detection.min_confidence, 0.8);
        assert_eq!(config.detection.detection_interval_ms, DEFAULT_DETECTION_INTERVAL_MS);
        assert_eq!(config.estimator, PoseCoefficients::default());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.detection.min_confidence = 1.5;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.exercise.hold_seconds = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.exercise.routine.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gate.roll = Some(-1.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.estimator.nose_mouth_ratio = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.estimator.yaw_scale = -45.0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.estimator.pitch_scale = 0.0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.detection.detection_interval_ms = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.exercise.feedback_interval_ms = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("estimator: [not, a, map]"),
            Err(Error::ConfigError(_))
        ));
    }
}
