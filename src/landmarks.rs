//! Face detection records as produced by an upstream face detector.
//!
//! A detection carries a bounding box, a confidence score and an ordered
//! list of landmarks. Landmarks have no names of their own; their position
//! in the list is what identifies them (see [`Landmark`]).

use crate::constants::NUM_FACE_LANDMARKS;
use serde::{Deserialize, Serialize};

/// A point in image pixel coordinates
///
/// Serialized as a two-element `[x, y]` array, the shape detectors emit.
/// An `{ x, y }` map is accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PointRepr", into = "[f64; 2]")]
pub struct Point2D {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate, growing downwards
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Point shifted straight down by `dy` pixels
    #[must_use]
    pub fn below(&self, dy: f64) -> Self {
        Self::new(self.x, self.y + dy)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Array([f64; 2]),
    Map { x: f64, y: f64 },
}

impl From<PointRepr> for Point2D {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Array([x, y]) | PointRepr::Map { x, y } => Self::new(x, y),
        }
    }
}

/// Positions of the six landmarks in a detection's landmark list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    RightEye = 0,
    LeftEye = 1,
    Nose = 2,
    Mouth = 3,
    RightEar = 4,
    LeftEar = 5,
}

impl Landmark {
    /// All landmarks in detector order
    pub const ALL: [Self; NUM_FACE_LANDMARKS] = [
        Self::RightEye,
        Self::LeftEye,
        Self::Nose,
        Self::Mouth,
        Self::RightEar,
        Self::LeftEar,
    ];

    /// Index of this landmark in a detection's landmark list
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RightEye => "R Eye",
            Self::LeftEye => "L Eye",
            Self::Nose => "Nose",
            Self::Mouth => "Mouth",
            Self::RightEar => "R Ear",
            Self::LeftEar => "L Ear",
        }
    }
}

/// One detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    /// Top-left corner of the face bounding box
    pub top_left: Point2D,
    /// Bottom-right corner of the face bounding box
    pub bottom_right: Point2D,
    /// Landmarks in [`Landmark`] order; trailing ones may be missing
    #[serde(default)]
    pub landmarks: Vec<Point2D>,
    /// Detector confidence in [0, 1]
    pub probability: f64,
}

impl FaceDetection {
    /// Create a new detection record
    #[must_use]
    pub fn new(top_left: Point2D, bottom_right: Point2D, landmarks: Vec<Point2D>, probability: f64) -> Self {
        Self {
            top_left,
            bottom_right,
            landmarks,
            probability,
        }
    }

    /// Bounding box width in pixels
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    /// Bounding box height in pixels
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    /// Center of the bounding box
    #[must_use]
    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.top_left.x + self.bottom_right.x) / 2.0,
            (self.top_left.y + self.bottom_right.y) / 2.0,
        )
    }

    /// Landmark by name, if the detector reported it
    #[must_use]
    pub fn landmark(&self, landmark: Landmark) -> Option<Point2D> {
        self.landmarks.get(landmark.index()).copied()
    }

    /// Horizontally mirrored copy around the bounding box center.
    ///
    /// The eye and ear labels swap sides, so the result is what the detector
    /// would report for the mirrored image.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let axis = self.top_left.x + self.bottom_right.x;
        let flip = |p: Point2D| Point2D::new(axis - p.x, p.y);

        let mut landmarks: Vec<Point2D> = self.landmarks.iter().copied().map(flip).collect();
        for (a, b) in [(Landmark::RightEye, Landmark::LeftEye), (Landmark::RightEar, Landmark::LeftEar)] {
            if landmarks.len() > b.index() {
                landmarks.swap(a.index(), b.index());
            }
        }

        Self {
            top_left: Point2D::new(axis - self.bottom_right.x, self.top_left.y),
            bottom_right: Point2D::new(axis - self.top_left.x, self.bottom_right.y),
            landmarks,
            probability: self.probability,
        }
    }
}

/// Pick the face to track from one frame's detections.
///
/// The detector reports faces strongest-first, so this is the first face
/// whose confidence reaches `min_confidence`.
#[must_use]
pub fn select_primary_face(faces: &[FaceDetection], min_confidence: f64) -> Option<&FaceDetection> {
    faces.iter().find(|face| face.probability >= min_confidence)
}
