//! Configuration data model
//!
//! A [`CadConfiguration`] is the validated, declarative description of a
//! solid: components with parameters and placement, operations combining
//! them, and export preferences.

mod check;
pub mod features;
pub mod operations;
pub mod parameters;
pub mod sketch;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tc_cad::ExportFormat;

pub use features::{
    Boss, CircularHole, CounterboreHole, CountersunkHole, Feature, Pocket, RectangularHole, Rib,
    Slot, ThreadClass, ThreadedHole, corner_offset_positions,
};
pub use operations::{
    ArrayParameters, BooleanParameters, ChamferParameters, FilletParameters, MirrorParameters,
    Operation, OperationParameters, OperationType, PatternParameters, PatternType, ShellParameters,
};
pub use parameters::{
    BevelGearParameters, BoxParameters, ConeParameters, CylinderParameters, Parameters,
    SphereParameters, SpurGearParameters, TorusParameters, WedgeParameters,
};
pub use sketch::{Constraint, ConstraintType, Sketch, SketchElement};

use crate::error::ValidationError;
use crate::units::Units;

/// Descriptive information about a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unit the model was described in; stored lengths are always mm
    #[serde(default)]
    pub units: Units,
}

/// Principal construction plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plane {
    #[default]
    #[serde(rename = "XY")]
    Xy,
    #[serde(rename = "XZ")]
    Xz,
    #[serde(rename = "YZ")]
    Yz,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workplane {
    #[serde(default)]
    pub plane: Plane,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
}

fn default_tolerance() -> f64 {
    0.1
}

fn default_binary() -> bool {
    true
}

/// Export preferences carried by a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Unset means the format configured in the settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default = "default_tolerance")]
    pub precision: f64,
    #[serde(default = "default_tolerance")]
    pub angular_tolerance: f64,
    #[serde(default = "default_binary")]
    pub binary: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: None,
            filename: None,
            precision: default_tolerance(),
            angular_tolerance: default_tolerance(),
            binary: default_binary(),
        }
    }
}

/// Wire form shared by [`Shape`] and [`Gear`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: Parameters,
    #[serde(default)]
    pub position: DVec3,
    #[serde(default)]
    pub rotation: DVec3,
}

/// Map short gear type names onto their parameter tags
fn canonical_type(kind: &str) -> &str {
    match kind {
        "spur" => "spur_gear",
        "bevel" => "bevel_gear",
        other => other,
    }
}

fn check_component(
    kind: &str,
    parameters: &Parameters,
    gear: bool,
) -> Result<(), ValidationError> {
    if canonical_type(kind) != parameters.type_key() {
        return Err(ValidationError::new(
            "type",
            format!(
                "'{}' does not match parameters of type '{}'",
                kind,
                parameters.type_key()
            ),
        ));
    }
    if parameters.is_gear() != gear {
        let expected = if gear { "a gear" } else { "a shape" };
        return Err(ValidationError::new(
            "parameters",
            format!("'{}' is not {}", parameters.type_key(), expected),
        ));
    }
    parameters.validate()
}

/// A primitive solid placed in the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ComponentRecord", into = "ComponentRecord")]
pub struct Shape {
    pub id: Option<String>,
    parameters: Parameters,
    pub position: DVec3,
    /// Euler angles in degrees, applied X then Y then Z
    pub rotation: DVec3,
}

impl Shape {
    /// Create a shape at the origin; gear parameters are rejected
    pub fn new(parameters: Parameters) -> Result<Self, ValidationError> {
        check_component(parameters.type_key(), &parameters, false)?;
        Ok(Self {
            id: None,
            parameters,
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: DVec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn type_key(&self) -> &'static str {
        self.parameters.type_key()
    }
}

impl TryFrom<ComponentRecord> for Shape {
    type Error = ValidationError;

    fn try_from(record: ComponentRecord) -> Result<Self, Self::Error> {
        check_component(&record.kind, &record.parameters, false)?;
        Ok(Self {
            id: record.id,
            parameters: record.parameters,
            position: record.position,
            rotation: record.rotation,
        })
    }
}

impl From<Shape> for ComponentRecord {
    fn from(shape: Shape) -> Self {
        Self {
            id: shape.id,
            kind: shape.parameters.type_key().to_string(),
            parameters: shape.parameters,
            position: shape.position,
            rotation: shape.rotation,
        }
    }
}

/// A gear placed in the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ComponentRecord", into = "ComponentRecord")]
pub struct Gear {
    pub id: Option<String>,
    parameters: Parameters,
    pub position: DVec3,
    pub rotation: DVec3,
}

impl Gear {
    /// Create a gear at the origin; shape parameters are rejected
    pub fn new(parameters: Parameters) -> Result<Self, ValidationError> {
        check_component(parameters.type_key(), &parameters, true)?;
        Ok(Self {
            id: None,
            parameters,
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: DVec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn type_key(&self) -> &'static str {
        self.parameters.type_key()
    }
}

impl TryFrom<ComponentRecord> for Gear {
    type Error = ValidationError;

    fn try_from(record: ComponentRecord) -> Result<Self, Self::Error> {
        check_component(&record.kind, &record.parameters, true)?;
        Ok(Self {
            id: record.id,
            parameters: record.parameters,
            position: record.position,
            rotation: record.rotation,
        })
    }
}

impl From<Gear> for ComponentRecord {
    fn from(gear: Gear) -> Self {
        Self {
            id: gear.id,
            kind: gear.parameters.type_key().to_string(),
            parameters: gear.parameters,
            position: gear.position,
            rotation: gear.rotation,
        }
    }
}

/// Complete model description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadConfiguration {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplane: Option<Workplane>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gears: Option<Vec<Gear>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch: Option<Sketch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSettings>,
}

impl CadConfiguration {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn gears(&self) -> &[Gear] {
        self.gears.as_deref().unwrap_or_default()
    }

    pub fn operations(&self) -> &[Operation] {
        self.operations.as_deref().unwrap_or_default()
    }

    /// Number of shapes and gears
    pub fn component_count(&self) -> usize {
        self.shapes.len() + self.gears().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_rejects_gear_parameters() {
        let gear = Parameters::SpurGear(SpurGearParameters::new(1.0, 10, 5.0).unwrap());
        assert!(Shape::new(gear.clone()).is_err());
        assert!(Gear::new(gear).is_ok());

        let cube = Parameters::Box(BoxParameters::cube(1.0).unwrap());
        assert!(Gear::new(cube).is_err());
    }

    #[test]
    fn test_shape_type_must_match_parameters() {
        let json = r#"{
            "type": "cylinder",
            "parameters": {"type": "box", "length": 1, "width": 1, "height": 1}
        }"#;
        let err = serde_json::from_str::<Shape>(json).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_shape_deserialize_validates() {
        let json = r#"{
            "type": "box",
            "parameters": {"type": "box", "length": 1, "width": -1, "height": 1}
        }"#;
        assert!(serde_json::from_str::<Shape>(json).is_err());
    }

    #[test]
    fn test_gear_short_type_name() {
        let json = r#"{
            "id": "drive",
            "type": "spur",
            "parameters": {"type": "spur_gear", "module": 1, "teeth": 20, "width": 6},
            "position": [10, 0, 0]
        }"#;
        let gear: Gear = serde_json::from_str(json).unwrap();
        assert_eq!(gear.id.as_deref(), Some("drive"));
        assert_eq!(gear.type_key(), "spur_gear");
        assert_eq!(gear.position, DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(gear.rotation, DVec3::ZERO);
    }

    #[test]
    fn test_configuration_roundtrip() {
        let shape = Shape::new(Parameters::Box(BoxParameters::new(10.0, 20.0, 30.0).unwrap()))
            .unwrap()
            .with_id("base")
            .at(DVec3::new(1.0, 2.0, 3.0));
        let config = CadConfiguration {
            shapes: vec![shape],
            operations: Some(vec![Operation::new(OperationType::Fillet, ["base"])
                .with_parameters(OperationParameters::Fillet(FilletParameters {
                    radius: 1.0,
                    edges: None,
                }))]),
            export: Some(ExportSettings::default()),
            ..Default::default()
        };

        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"type\": \"box\""));
        let back = CadConfiguration::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_configuration_defaults() {
        let config = CadConfiguration::from_json("{}").unwrap();
        assert!(config.shapes.is_empty());
        assert!(config.gears().is_empty());
        assert!(config.operations().is_empty());
        assert_eq!(config.metadata.units, Units::Mm);
        assert_eq!(config.component_count(), 0);
    }
}
