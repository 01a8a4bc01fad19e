//! Features cut into or added onto a face of a shape
//!
//! Every feature carries a face selector and a position in the local
//! coordinates of that face, measured from the face center.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tc_cad::Face;

use super::check::{finite, in_range, non_negative, positive, positive_opt};
use crate::error::ValidationError;

/// A feature applied to a shape face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    CircularHole(CircularHole),
    RectangularHole(RectangularHole),
    CounterboreHole(CounterboreHole),
    CountersunkHole(CountersunkHole),
    ThreadedHole(ThreadedHole),
    Slot(Slot),
    Pocket(Pocket),
    Boss(Boss),
    Rib(Rib),
}

impl Feature {
    /// Type tag of this feature
    pub fn kind(&self) -> &'static str {
        match self {
            Feature::CircularHole(_) => "circular_hole",
            Feature::RectangularHole(_) => "rectangular_hole",
            Feature::CounterboreHole(_) => "counterbore_hole",
            Feature::CountersunkHole(_) => "countersunk_hole",
            Feature::ThreadedHole(_) => "threaded_hole",
            Feature::Slot(_) => "slot",
            Feature::Pocket(_) => "pocket",
            Feature::Boss(_) => "boss",
            Feature::Rib(_) => "rib",
        }
    }

    pub fn face(&self) -> Face {
        match self {
            Feature::CircularHole(f) => f.face,
            Feature::RectangularHole(f) => f.face,
            Feature::CounterboreHole(f) => f.face,
            Feature::CountersunkHole(f) => f.face,
            Feature::ThreadedHole(f) => f.face,
            Feature::Slot(f) => f.face,
            Feature::Pocket(f) => f.face,
            Feature::Boss(f) => f.face,
            Feature::Rib(f) => f.face,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Feature::CircularHole(f) => f.validate(),
            Feature::RectangularHole(f) => {
                positive("width", f.width)?;
                positive("height", f.height)?;
                positive_opt("depth", f.depth)
            }
            Feature::CounterboreHole(f) => {
                positive("hole_diameter", f.hole_diameter)?;
                positive("counterbore_diameter", f.counterbore_diameter)?;
                positive("counterbore_depth", f.counterbore_depth)?;
                positive("total_depth", f.total_depth)
            }
            Feature::CountersunkHole(f) => {
                positive("hole_diameter", f.hole_diameter)?;
                positive("countersink_diameter", f.countersink_diameter)?;
                positive("countersink_angle", f.countersink_angle)?;
                positive("total_depth", f.total_depth)
            }
            Feature::ThreadedHole(f) => {
                positive("nominal_diameter", f.nominal_diameter)?;
                positive("pitch", f.pitch)?;
                positive_opt("depth", f.depth)
            }
            Feature::Slot(f) => {
                positive("length", f.length)?;
                positive("width", f.width)?;
                positive_opt("depth", f.depth)?;
                finite("angle", f.angle)
            }
            Feature::Pocket(f) => {
                positive("length", f.length)?;
                positive("width", f.width)?;
                positive("depth", f.depth)?;
                non_negative("corner_radius", f.corner_radius)
            }
            Feature::Boss(f) => {
                positive("diameter", f.diameter)?;
                positive("height", f.height)
            }
            Feature::Rib(f) => {
                positive("height", f.height)?;
                positive("thickness", f.thickness)?;
                in_range("draft_angle", f.draft_angle, -45.0, 45.0)
            }
        }
    }
}

/// A round hole, through-all when `depth` is unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularHole {
    pub diameter: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

impl CircularHole {
    /// A through-all hole on the top face
    pub fn new(position: DVec2, diameter: f64) -> Result<Self, ValidationError> {
        let hole = Self {
            diameter,
            depth: None,
            position,
            face: Face::PosZ,
        };
        hole.validate()?;
        Ok(hole)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("diameter", self.diameter)?;
        positive_opt("depth", self.depth)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangularHole {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterboreHole {
    pub hole_diameter: f64,
    pub counterbore_diameter: f64,
    pub counterbore_depth: f64,
    pub total_depth: f64,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountersunkHole {
    pub hole_diameter: f64,
    pub countersink_diameter: f64,
    pub countersink_angle: f64,
    pub total_depth: f64,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

/// ISO thread tolerance class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThreadClass {
    #[default]
    #[serde(rename = "6H")]
    SixH,
    #[serde(rename = "6G")]
    SixG,
    #[serde(rename = "4H")]
    FourH,
    #[serde(rename = "5G")]
    FiveG,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadedHole {
    pub nominal_diameter: f64,
    pub pitch: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub thread_class: ThreadClass,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub length: f64,
    pub width: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub position: DVec2,
    /// Rotation of the slot axis in the face plane, degrees
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub length: f64,
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub diameter: f64,
    pub height: f64,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rib {
    pub profile_points: Vec<DVec2>,
    pub height: f64,
    pub thickness: f64,
    #[serde(default)]
    pub draft_angle: f64,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub face: Face,
}

/// Positions of four holes inset by `offset` from the corners of a
/// `length` x `width` face, counter-clockwise from the (+X, +Y) corner.
pub fn corner_offset_positions(length: f64, width: f64, offset: f64) -> [DVec2; 4] {
    let (hx, hy) = (length / 2.0 - offset, width / 2.0 - offset);
    [
        DVec2::new(hx, hy),
        DVec2::new(-hx, hy),
        DVec2::new(-hx, -hy),
        DVec2::new(hx, -hy),
    ]
}
