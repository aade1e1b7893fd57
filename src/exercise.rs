//! Exercise compliance tracking.
//!
//! Each exercise asks the user to hold a head pose for a fixed time. The
//! session walks a list of exercises through
//! `Inactive -> Active -> Holding -> Completed`, one at a time, driven by
//! head poses from the tracker. Whether a pose counts is decided by a pure
//! predicate per exercise kind, so the pose math stays separate from the
//! timing policy here.

use crate::{
    config::ExerciseConfig,
    constants::{DEFAULT_HOLD_SECONDS, DEFAULT_NEUTRAL_PITCH_LIMIT, DEFAULT_NEUTRAL_YAW_LIMIT, DEFAULT_TILT_THRESHOLD},
    pose_estimation::HeadPose,
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pose thresholds used by the exercise predicates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseLimits {
    /// Largest |yaw| still counted as facing the camera
    pub neutral_yaw_limit: f64,
    /// Largest |pitch| still counted as a level head
    pub neutral_pitch_limit: f64,
    /// Roll magnitude a tilt must exceed
    pub tilt_threshold: f64,
}

impl Default for ExerciseLimits {
    fn default() -> Self {
        Self {
            neutral_yaw_limit: DEFAULT_NEUTRAL_YAW_LIMIT,
            neutral_pitch_limit: DEFAULT_NEUTRAL_PITCH_LIMIT,
            tilt_threshold: DEFAULT_TILT_THRESHOLD,
        }
    }
}

/// The poses an exercise can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Face the camera with the head level
    StandStraight,
    /// Tilt the head towards the left shoulder (negative roll)
    TiltLeft,
    /// Tilt the head towards the right shoulder (positive roll)
    TiltRight,
}

impl ExerciseKind {
    /// Whether `pose` satisfies this exercise
    #[must_use]
    pub fn is_satisfied(self, pose: &HeadPose, limits: &ExerciseLimits) -> bool {
        match self {
            Self::StandStraight => {
                pose.yaw.abs() < limits.neutral_yaw_limit && pose.pitch.abs() < limits.neutral_pitch_limit
            }
            Self::TiltLeft => pose.roll < -limits.tilt_threshold,
            Self::TiltRight => pose.roll > limits.tilt_threshold,
        }
    }

    /// Instruction given when the exercise starts, for a hold of `hold`
    #[must_use]
    pub fn instruction(self, hold: Duration) -> String {
        match self {
            Self::StandStraight => "Stand up straight.".to_string(),
            Self::TiltLeft => format!("Tilt your head to the left, hold for {} seconds.", hold.as_secs_f64()),
            Self::TiltRight => format!("Tilt your head to the right, hold for {} seconds.", hold.as_secs_f64()),
        }
    }

    /// Message given when the user leaves the pose mid-hold
    #[must_use]
    pub fn correction(self) -> &'static str {
        match self {
            Self::StandStraight => "Try to face the camera directly with your head straight",
            Self::TiltLeft => "Try to tilt your head to the left",
            Self::TiltRight => "Try to tilt your head to the right",
        }
    }

    fn encouragement(self, hold: Duration) -> String {
        let prefix = match self {
            Self::StandStraight => "Good posture!",
            Self::TiltLeft | Self::TiltRight => "Good!",
        };
        format!("{prefix} Keep holding for {} seconds...", hold.as_secs_f64())
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StandStraight => "stand straight",
            Self::TiltLeft => "tilt left",
            Self::TiltRight => "tilt right",
        };
        f.write_str(name)
    }
}

/// Progress of a single exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseStatus {
    /// Not reached yet
    Inactive,
    /// Current exercise, waiting for the pose
    Active,
    /// Current exercise, pose held since `since`
    Holding { since: Instant },
    /// Done
    Completed,
}

/// An exercise and its progress
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub kind: ExerciseKind,
    pub status: ExerciseStatus,
}

/// Result of evaluating one pose against the session
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Nothing to report
    Idle,
    /// Pose reached; the hold timer has started
    Good(String),
    /// Pose still held; time left until the exercise completes
    Holding { remaining: Duration },
    /// Pose lost during a hold; the timer was cleared
    Warning(String),
    /// An exercise completed and the next one is now active
    StepCompleted { completed: ExerciseKind, next: ExerciseKind },
    /// The last exercise completed
    SessionCompleted,
}

/// A scripted sequence of exercises
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    exercises: Vec<Exercise>,
    current: Option<usize>,
    hold_duration: Duration,
    limits: ExerciseLimits,
}

impl ExerciseSession {
    /// Create a session over `kinds`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `kinds` is empty or the hold duration is zero
    pub fn new(kinds: &[ExerciseKind], hold_duration: Duration, limits: ExerciseLimits) -> Result<Self> {
        if kinds.is_empty() {
            return Err(Error::InvalidInput("Exercise session needs at least one exercise".to_string()));
        }
        if hold_duration.is_zero() {
            return Err(Error::InvalidInput("Hold duration must be greater than 0".to_string()));
        }

        Ok(Self {
            exercises: kinds
                .iter()
                .map(|&kind| Exercise {
                    kind,
                    status: ExerciseStatus::Inactive,
                })
                .collect(),
            current: None,
            hold_duration,
            limits,
        })
    }

    /// The neck stretch routine: stand straight, tilt left, tilt right
    #[must_use]
    pub fn standard() -> Self {
        Self {
            exercises: [ExerciseKind::StandStraight, ExerciseKind::TiltLeft, ExerciseKind::TiltRight]
                .into_iter()
                .map(|kind| Exercise {
                    kind,
                    status: ExerciseStatus::Inactive,
                })
                .collect(),
            current: None,
            hold_duration: Duration::from_secs_f64(DEFAULT_HOLD_SECONDS),
            limits: ExerciseLimits::default(),
        }
    }

    /// The standard routine with timing and thresholds from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the hold time is not a positive number of seconds
    pub fn from_config(config: &ExerciseConfig) -> Result<Self> {
        let hold_duration = Duration::try_from_secs_f64(config.hold_seconds)
            .map_err(|e| Error::ConfigError(format!("Invalid hold time {}: {}", config.hold_seconds, e)))?;
        let limits = ExerciseLimits {
            neutral_yaw_limit: config.neutral_yaw_limit,
            neutral_pitch_limit: config.neutral_pitch_limit,
            tilt_threshold: config.tilt_threshold,
        };
        Self::new(&config.routine, hold_duration, limits)
    }

    /// Activate the first exercise
    pub fn start(&mut self) {
        self.reset();
        if let Some(first) = self.exercises.first_mut() {
            first.status = ExerciseStatus::Active;
            self.current = Some(0);
            info!("Exercise session started: {}", first.kind.instruction(self.hold_duration));
        }
    }

    /// Evaluate one pose at time `now`
    pub fn evaluate(&mut self, pose: &HeadPose, now: Instant) -> Feedback {
        let Some(index) = self.current else {
            return Feedback::Idle;
        };

        let hold_duration = self.hold_duration;
        let exercise = &mut self.exercises[index];
        let satisfied = exercise.kind.is_satisfied(pose, &self.limits);

        match (exercise.status, satisfied) {
            (ExerciseStatus::Active, true) => {
                exercise.status = ExerciseStatus::Holding { since: now };
                debug!("Hold started for {}", exercise.kind);
                Feedback::Good(exercise.kind.encouragement(hold_duration))
            }
            (ExerciseStatus::Holding { since }, true) => {
                let held = now.saturating_duration_since(since);
                if held >= hold_duration {
                    exercise.status = ExerciseStatus::Completed;
                    let completed = exercise.kind;
                    self.advance(index, completed)
                } else {
                    Feedback::Holding {
                        remaining: hold_duration - held,
                    }
                }
            }
            (ExerciseStatus::Holding { .. }, false) => {
                exercise.status = ExerciseStatus::Active;
                debug!("Hold lost for {}", exercise.kind);
                Feedback::Warning(exercise.kind.correction().to_string())
            }
            _ => Feedback::Idle,
        }
    }

    fn advance(&mut self, index: usize, completed: ExerciseKind) -> Feedback {
        info!("Exercise completed: {}", completed);
        match self.exercises.get_mut(index + 1) {
            Some(next) => {
                next.status = ExerciseStatus::Active;
                self.current = Some(index + 1);
                info!("Next exercise: {}", next.kind.instruction(self.hold_duration));
                Feedback::StepCompleted {
                    completed,
                    next: next.kind,
                }
            }
            None => {
                self.current = None;
                info!("All exercises completed");
                Feedback::SessionCompleted
            }
        }
    }

    /// Current exercise, if the session is running
    #[must_use]
    pub fn current(&self) -> Option<&Exercise> {
        self.current.map(|i| &self.exercises[i])
    }

    /// All exercises in order
    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Number of completed exercises
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.exercises
            .iter()
            .filter(|e| e.status == ExerciseStatus::Completed)
            .count()
    }

    /// Every exercise is completed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_count() == self.exercises.len()
    }

    /// Hold time required per exercise
    #[must_use]
    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Return every exercise to `Inactive`
    pub fn reset(&mut self) {
        for exercise in &mut self.exercises {
            exercise.status = ExerciseStatus::Inactive;
        }
        self.current = None;
    }
}
