//! Geometry engine trait definitions
//!
//! These types define the boundary between the configuration pipeline and
//! whatever engine performs the actual solid modeling.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for geometry engine operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Solid not found: {0}")]
    SolidNotFound(Uuid),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("File I/O error: {0}")]
    FileIo(String),
}

/// Result type for geometry engine operations
pub type CadResult<T> = Result<T, CadError>;

/// Opaque handle to a solid owned by a kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
}

impl Solid {
    /// Create a handle with the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// One of the six principal face directions of a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Face {
    /// Face with the largest Z
    #[default]
    #[serde(rename = ">Z")]
    PosZ,
    /// Face with the smallest Z
    #[serde(rename = "<Z")]
    NegZ,
    /// Face with the largest Y
    #[serde(rename = ">Y")]
    PosY,
    /// Face with the smallest Y
    #[serde(rename = "<Y")]
    NegY,
    /// Face with the largest X
    #[serde(rename = ">X")]
    PosX,
    /// Face with the smallest X
    #[serde(rename = "<X")]
    NegX,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosZ,
        Face::NegZ,
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
    ];

    /// Selector string (`>Z`, `<X`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Face::PosZ => ">Z",
            Face::NegZ => "<Z",
            Face::PosY => ">Y",
            Face::NegY => "<Y",
            Face::PosX => ">X",
            Face::NegX => "<X",
        }
    }

    /// Outward normal of the face
    pub fn normal(&self) -> DVec3 {
        match self {
            Face::PosZ => DVec3::Z,
            Face::NegZ => DVec3::NEG_Z,
            Face::PosY => DVec3::Y,
            Face::NegY => DVec3::NEG_Y,
            Face::PosX => DVec3::X,
            Face::NegX => DVec3::NEG_X,
        }
    }

    /// Index of the axis the face is perpendicular to (0 = X, 1 = Y, 2 = Z)
    pub fn axis_index(&self) -> usize {
        match self {
            Face::PosX | Face::NegX => 0,
            Face::PosY | Face::NegY => 1,
            Face::PosZ | Face::NegZ => 2,
        }
    }

    /// Axis indices spanning the face plane, as (local x, local y)
    pub fn plane_axes(&self) -> (usize, usize) {
        match self.axis_index() {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Face {
    type Err = CadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CadError::InvalidParameter(format!("unknown face selector '{}'", s)))
    }
}

/// Plane through the origin used for mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MirrorPlane {
    #[serde(rename = "XY")]
    Xy,
    #[serde(rename = "XZ")]
    Xz,
    #[default]
    #[serde(rename = "YZ")]
    Yz,
}

impl MirrorPlane {
    /// Index of the axis that flips sign under this mirror
    pub fn flipped_axis(&self) -> usize {
        match self {
            MirrorPlane::Yz => 0,
            MirrorPlane::Xz => 1,
            MirrorPlane::Xy => 2,
        }
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (add)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create a box from two opposite corners
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a box centered on `center` with the given full size
    pub fn from_center_size(center: DVec3, size: DVec3) -> Self {
        Self::new(center - size * 0.5, center + size * 0.5)
    }

    /// Smallest box containing all points
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self { min: p, max: p }),
            Some(b) => Some(Self {
                min: b.min.min(p),
                max: b.max.max(p),
            }),
        })
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlapping region, if the boxes overlap with positive volume
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min.x < max.x && min.y < max.y && min.z < max.z).then_some(Aabb { min, max })
    }

    pub fn translated(&self, offset: DVec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(b.x, b.y, b.z),
            DVec3::new(a.x, b.y, b.z),
        ]
    }

    /// Center point of one of the six faces
    pub fn face_center(&self, face: Face) -> DVec3 {
        let mut c = self.center();
        let k = face.axis_index();
        c[k] = if face.normal()[k] > 0.0 {
            self.max[k]
        } else {
            self.min[k]
        };
        c
    }
}

/// Primitive solids the engine knows how to build
///
/// All lengths are millimeters and all angles degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Box {
        length: f64,
        width: f64,
        height: f64,
        centered: bool,
    },
    Cylinder {
        radius: f64,
        height: f64,
        angle: f64,
        centered: bool,
    },
    Sphere {
        radius: f64,
        angle1: f64,
        angle2: f64,
        angle3: f64,
        centered: bool,
    },
    Cone {
        radius1: f64,
        radius2: f64,
        height: f64,
        angle: f64,
        centered: bool,
    },
    Torus {
        major_radius: f64,
        minor_radius: f64,
        angle1: f64,
        angle2: f64,
        angle3: f64,
    },
    Wedge {
        dx: f64,
        dy: f64,
        dz: f64,
        xmin: f64,
        zmin: f64,
        xmax: f64,
        zmax: f64,
    },
    SpurGear {
        module: f64,
        teeth: u32,
        width: f64,
        bore: f64,
        pressure_angle: f64,
        clearance: f64,
        backlash: f64,
        hub_diameter: Option<f64>,
        hub_length: Option<f64>,
    },
    BevelGear {
        module: f64,
        teeth: u32,
        cone_angle: f64,
        pressure_angle: f64,
        helix_angle: f64,
        bore: f64,
        clearance: f64,
        backlash: f64,
        face_width: f64,
    },
}

impl Primitive {
    /// Kind name of this primitive
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "box",
            Primitive::Cylinder { .. } => "cylinder",
            Primitive::Sphere { .. } => "sphere",
            Primitive::Cone { .. } => "cone",
            Primitive::Torus { .. } => "torus",
            Primitive::Wedge { .. } => "wedge",
            Primitive::SpurGear { .. } => "spur_gear",
            Primitive::BevelGear { .. } => "bevel_gear",
        }
    }
}

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Step,
    Stl,
    Obj,
    Ply,
    Amf,
    #[serde(rename = "3mf")]
    ThreeMf,
    Gltf,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 8] = [
        ExportFormat::Step,
        ExportFormat::Stl,
        ExportFormat::Obj,
        ExportFormat::Ply,
        ExportFormat::Amf,
        ExportFormat::ThreeMf,
        ExportFormat::Gltf,
        ExportFormat::Json,
    ];

    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Step => "step",
            ExportFormat::Stl => "stl",
            ExportFormat::Obj => "obj",
            ExportFormat::Ply => "ply",
            ExportFormat::Amf => "amf",
            ExportFormat::ThreeMf => "3mf",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.');
        if s.eq_ignore_ascii_case("stp") {
            return Ok(ExportFormat::Step);
        }
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| CadError::UnsupportedFormat(s.to_string()))
    }
}

/// A named part inside an assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyPart {
    pub name: String,
    pub solid: Solid,
}

/// A named collection of solids handed to the engine for export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub parts: Vec<AssemblyPart>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a solid under the given part name
    pub fn add(mut self, solid: Solid, name: impl Into<String>) -> Self {
        self.parts.push(AssemblyPart {
            name: name.into(),
            solid,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// The geometry engine trait
///
/// Solids are immutable: every operation returns a new handle and leaves its
/// inputs untouched.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// An empty reference workplane (a solid with no material)
    fn workplane(&self) -> CadResult<Solid>;

    /// Build a primitive at the origin
    fn make_primitive(&self, primitive: &Primitive) -> CadResult<Solid>;

    /// Perform a boolean operation on two solids
    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid>;

    /// Translate a solid
    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid>;

    /// Rotate a solid about the axis through `pivot`
    ///
    /// # Arguments
    /// * `pivot` - A point on the rotation axis
    /// * `axis` - Axis direction (need not be normalized)
    /// * `degrees` - Rotation angle in degrees
    fn rotate(&self, solid: &Solid, pivot: DVec3, axis: DVec3, degrees: f64) -> CadResult<Solid>;

    /// Cut a circular hole into a face
    ///
    /// # Arguments
    /// * `face` - Face the hole starts from
    /// * `position` - Hole center relative to the face center, in face coordinates
    /// * `diameter` - Hole diameter
    /// * `depth` - Hole depth, `None` for through-all
    fn cut_hole(
        &self,
        solid: &Solid,
        face: Face,
        position: DVec2,
        diameter: f64,
        depth: Option<f64>,
    ) -> CadResult<Solid>;

    /// Round all edges of a solid
    fn fillet(&self, solid: &Solid, radius: f64) -> CadResult<Solid>;

    /// Bevel all edges of a solid
    fn chamfer(&self, solid: &Solid, length: f64) -> CadResult<Solid>;

    /// Hollow out a solid, leaving the given faces open
    fn shell(&self, solid: &Solid, thickness: f64, faces_to_remove: &[Face]) -> CadResult<Solid>;

    /// Mirror a solid across a plane through the origin
    fn mirror(&self, solid: &Solid, plane: MirrorPlane) -> CadResult<Solid>;

    /// Bounding box of a solid, `None` if it has no material
    fn bounding_box(&self, solid: &Solid) -> CadResult<Option<Aabb>>;

    /// Enclosed volume of a solid
    fn volume(&self, solid: &Solid) -> CadResult<f64>;

    /// Serialize an assembly to a file
    fn export(&self, assembly: &Assembly, path: &Path, format: ExportFormat) -> CadResult<()>;

    /// Drop the geometry behind a handle. The handle is invalid afterwards.
    fn release(&self, _solid: &Solid) {}
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn workplane(&self) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn make_primitive(&self, _primitive: &Primitive) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn boolean(&self, _a: &Solid, _b: &Solid, _op: BooleanType) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn translate(&self, _solid: &Solid, _offset: DVec3) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn rotate(
        &self,
        _solid: &Solid,
        _pivot: DVec3,
        _axis: DVec3,
        _degrees: f64,
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn cut_hole(
        &self,
        _solid: &Solid,
        _face: Face,
        _position: DVec2,
        _diameter: f64,
        _depth: Option<f64>,
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn fillet(&self, _solid: &Solid, _radius: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn chamfer(&self, _solid: &Solid, _length: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn shell(
        &self,
        _solid: &Solid,
        _thickness: f64,
        _faces_to_remove: &[Face],
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn mirror(&self, _solid: &Solid, _plane: MirrorPlane) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn bounding_box(&self, _solid: &Solid) -> CadResult<Option<Aabb>> {
        Self::unavailable()
    }

    fn volume(&self, _solid: &Solid) -> CadResult<f64> {
        Self::unavailable()
    }

    fn export(&self, _assembly: &Assembly, _path: &Path, _format: ExportFormat) -> CadResult<()> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available for export".into(),
        ))
    }
}

/// Get the default geometry kernel
pub fn default_kernel() -> Box<dyn CadKernel> {
    Box::new(super::EnvelopeKernel::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_selector_roundtrip() {
        for face in Face::ALL {
            assert_eq!(face.as_str().parse::<Face>().unwrap(), face);
        }
        assert!("^Z".parse::<Face>().is_err());
    }

    #[test]
    fn test_face_serde_uses_selector() {
        let json = serde_json::to_string(&Face::NegX).unwrap();
        assert_eq!(json, "\"<X\"");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("STL".parse::<ExportFormat>().unwrap(), ExportFormat::Stl);
        assert_eq!(".stp".parse::<ExportFormat>().unwrap(), ExportFormat::Step);
        assert_eq!("3mf".parse::<ExportFormat>().unwrap(), ExportFormat::ThreeMf);
        assert!("dwg".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_aabb_intersection() {
        let a = Aabb::new(DVec3::ZERO, DVec3::splat(10.0));
        let b = Aabb::new(DVec3::splat(5.0), DVec3::splat(15.0));
        let c = Aabb::new(DVec3::splat(20.0), DVec3::splat(30.0));

        assert_eq!(a.intersection(&b).unwrap().volume(), 125.0);
        assert!(a.intersection(&c).is_none());
        assert_eq!(a.union(&c).size(), DVec3::splat(30.0));
    }

    #[test]
    fn test_face_center() {
        let b = Aabb::new(DVec3::ZERO, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(b.face_center(Face::PosZ), DVec3::new(5.0, 10.0, 30.0));
        assert_eq!(b.face_center(Face::NegX), DVec3::new(0.0, 10.0, 15.0));
    }

    #[test]
    fn test_null_kernel_rejects() {
        let kernel = NullKernel;
        assert!(!kernel.is_available());
        assert!(matches!(
            kernel.workplane(),
            Err(CadError::KernelNotAvailable(_))
        ));
    }
}
