//! Parameter models for shapes and gears
//!
//! All lengths are millimeters and all angles degrees. Constructors run
//! [`Parameters::validate`] so a constructed value is always within bounds.

use serde::{Deserialize, Serialize};
use tc_cad::Primitive;

use super::check::{finite, in_range, non_negative, positive, positive_opt};
use super::features::Feature;
use crate::error::ValidationError;

fn full_turn() -> f64 {
    360.0
}

fn south_pole() -> f64 {
    -90.0
}

fn north_pole() -> f64 {
    90.0
}

fn centered_default() -> bool {
    true
}

fn default_bore() -> f64 {
    5.0
}

fn default_pressure_angle() -> f64 {
    20.0
}

/// Parameters of any buildable component, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parameters {
    Box(BoxParameters),
    Cylinder(CylinderParameters),
    Sphere(SphereParameters),
    Cone(ConeParameters),
    Torus(TorusParameters),
    Wedge(WedgeParameters),
    SpurGear(SpurGearParameters),
    BevelGear(BevelGearParameters),
}

impl Parameters {
    /// Type tag, also the handler registry key
    pub fn type_key(&self) -> &'static str {
        match self {
            Parameters::Box(_) => "box",
            Parameters::Cylinder(_) => "cylinder",
            Parameters::Sphere(_) => "sphere",
            Parameters::Cone(_) => "cone",
            Parameters::Torus(_) => "torus",
            Parameters::Wedge(_) => "wedge",
            Parameters::SpurGear(_) => "spur_gear",
            Parameters::BevelGear(_) => "bevel_gear",
        }
    }

    pub fn is_gear(&self) -> bool {
        matches!(self, Parameters::SpurGear(_) | Parameters::BevelGear(_))
    }

    /// Features to apply after the primitive is built
    pub fn features(&self) -> &[Feature] {
        match self {
            Parameters::Box(p) => &p.features,
            Parameters::Cylinder(p) => &p.features,
            Parameters::Sphere(p) => &p.features,
            Parameters::Cone(p) => &p.features,
            Parameters::Torus(p) => &p.features,
            Parameters::Wedge(p) => &p.features,
            Parameters::SpurGear(_) | Parameters::BevelGear(_) => &[],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Parameters::Box(p) => p.validate(),
            Parameters::Cylinder(p) => p.validate(),
            Parameters::Sphere(p) => p.validate(),
            Parameters::Cone(p) => p.validate(),
            Parameters::Torus(p) => p.validate(),
            Parameters::Wedge(p) => p.validate(),
            Parameters::SpurGear(p) => p.validate(),
            Parameters::BevelGear(p) => p.validate(),
        }
    }

    /// The engine primitive these parameters describe
    pub fn to_primitive(&self) -> Primitive {
        match self {
            Parameters::Box(p) => p.to_primitive(),
            Parameters::Cylinder(p) => p.to_primitive(),
            Parameters::Sphere(p) => p.to_primitive(),
            Parameters::Cone(p) => p.to_primitive(),
            Parameters::Torus(p) => p.to_primitive(),
            Parameters::Wedge(p) => p.to_primitive(),
            Parameters::SpurGear(p) => p.to_primitive(),
            Parameters::BevelGear(p) => p.to_primitive(),
        }
    }
}

fn validate_features(features: &[Feature]) -> Result<(), ValidationError> {
    features.iter().try_for_each(Feature::validate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxParameters {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub centered: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl BoxParameters {
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, ValidationError> {
        let p = Self {
            length,
            width,
            height,
            centered: false,
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    /// A cube with equal sides
    pub fn cube(size: f64) -> Result<Self, ValidationError> {
        Self::new(size, size, size)
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Result<Self, ValidationError> {
        validate_features(&features)?;
        self.features = features;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("length", self.length)?;
        positive("width", self.width)?;
        positive("height", self.height)?;
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Box {
            length: self.length,
            width: self.width,
            height: self.height,
            centered: self.centered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderParameters {
    pub radius: f64,
    pub height: f64,
    #[serde(default = "full_turn")]
    pub angle: f64,
    #[serde(default)]
    pub centered: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl CylinderParameters {
    pub fn new(radius: f64, height: f64) -> Result<Self, ValidationError> {
        let p = Self {
            radius,
            height,
            angle: full_turn(),
            centered: false,
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("radius", self.radius)?;
        positive("height", self.height)?;
        in_range("angle", self.angle, 0.0, 360.0)?;
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Cylinder {
            radius: self.radius,
            height: self.height,
            angle: self.angle,
            centered: self.centered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereParameters {
    pub radius: f64,
    #[serde(default = "south_pole")]
    pub angle1: f64,
    #[serde(default = "north_pole")]
    pub angle2: f64,
    #[serde(default = "full_turn")]
    pub angle3: f64,
    #[serde(default)]
    pub centered: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl SphereParameters {
    pub fn new(radius: f64) -> Result<Self, ValidationError> {
        let p = Self {
            radius,
            angle1: south_pole(),
            angle2: north_pole(),
            angle3: full_turn(),
            centered: false,
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("radius", self.radius)?;
        in_range("angle1", self.angle1, -90.0, 90.0)?;
        in_range("angle2", self.angle2, -90.0, 90.0)?;
        in_range("angle3", self.angle3, 0.0, 360.0)?;
        if self.angle1 >= self.angle2 {
            return Err(ValidationError::new(
                "angle1",
                format!("must be below angle2 ({})", self.angle2),
            ));
        }
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Sphere {
            radius: self.radius,
            angle1: self.angle1,
            angle2: self.angle2,
            angle3: self.angle3,
            centered: self.centered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeParameters {
    pub radius1: f64,
    pub radius2: f64,
    pub height: f64,
    #[serde(default = "full_turn")]
    pub angle: f64,
    #[serde(default = "centered_default")]
    pub centered: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl ConeParameters {
    pub fn new(radius1: f64, radius2: f64, height: f64) -> Result<Self, ValidationError> {
        let p = Self {
            radius1,
            radius2,
            height,
            angle: full_turn(),
            centered: true,
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("radius1", self.radius1)?;
        non_negative("radius2", self.radius2)?;
        if self.radius1 == 0.0 && self.radius2 == 0.0 {
            return Err(ValidationError::new(
                "radius1",
                "radius1 and radius2 cannot both be zero",
            ));
        }
        positive("height", self.height)?;
        in_range("angle", self.angle, 0.0, 360.0)?;
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Cone {
            radius1: self.radius1,
            radius2: self.radius2,
            height: self.height,
            angle: self.angle,
            centered: self.centered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorusParameters {
    pub major_radius: f64,
    pub minor_radius: f64,
    #[serde(default)]
    pub angle1: f64,
    #[serde(default = "full_turn")]
    pub angle2: f64,
    #[serde(default = "full_turn")]
    pub angle3: f64,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl TorusParameters {
    pub fn new(major_radius: f64, minor_radius: f64) -> Result<Self, ValidationError> {
        let p = Self {
            major_radius,
            minor_radius,
            angle1: 0.0,
            angle2: full_turn(),
            angle3: full_turn(),
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("major_radius", self.major_radius)?;
        positive("minor_radius", self.minor_radius)?;
        if self.minor_radius >= self.major_radius {
            return Err(ValidationError::new(
                "minor_radius",
                format!("must be below major_radius ({})", self.major_radius),
            ));
        }
        in_range("angle1", self.angle1, 0.0, 360.0)?;
        in_range("angle2", self.angle2, 0.0, 360.0)?;
        in_range("angle3", self.angle3, 0.0, 360.0)?;
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Torus {
            major_radius: self.major_radius,
            minor_radius: self.minor_radius,
            angle1: self.angle1,
            angle2: self.angle2,
            angle3: self.angle3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WedgeParameters {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    #[serde(default)]
    pub xmin: f64,
    #[serde(default)]
    pub zmin: f64,
    #[serde(default)]
    pub xmax: f64,
    #[serde(default)]
    pub zmax: f64,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl WedgeParameters {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Result<Self, ValidationError> {
        let p = Self {
            dx,
            dy,
            dz,
            xmin: 0.0,
            zmin: 0.0,
            xmax: 0.0,
            zmax: 0.0,
            features: Vec::new(),
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("dx", self.dx)?;
        positive("dy", self.dy)?;
        positive("dz", self.dz)?;
        finite("xmin", self.xmin)?;
        finite("zmin", self.zmin)?;
        finite("xmax", self.xmax)?;
        finite("zmax", self.zmax)?;
        validate_features(&self.features)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::Wedge {
            dx: self.dx,
            dy: self.dy,
            dz: self.dz,
            xmin: self.xmin,
            zmin: self.zmin,
            xmax: self.xmax,
            zmax: self.zmax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpurGearParameters {
    pub module: f64,
    pub teeth: u32,
    pub width: f64,
    #[serde(default = "default_bore")]
    pub bore: f64,
    #[serde(default = "default_pressure_angle")]
    pub pressure_angle: f64,
    #[serde(default)]
    pub clearance: f64,
    #[serde(default)]
    pub backlash: f64,
    #[serde(default)]
    pub hub_diameter: Option<f64>,
    #[serde(default)]
    pub hub_length: Option<f64>,
}

impl SpurGearParameters {
    /// A gear with the default bore, narrowed to half the root diameter when
    /// the default would not fit.
    pub fn new(module: f64, teeth: u32, width: f64) -> Result<Self, ValidationError> {
        let root = root_diameter(module, teeth);
        let p = Self {
            module,
            teeth,
            width,
            bore: if default_bore() < root {
                default_bore()
            } else {
                root / 2.0
            },
            pressure_angle: default_pressure_angle(),
            clearance: 0.0,
            backlash: 0.0,
            hub_diameter: None,
            hub_length: None,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("module", self.module)?;
        check_teeth(self.teeth)?;
        positive("width", self.width)?;
        non_negative("bore", self.bore)?;
        in_range("pressure_angle", self.pressure_angle, 0.0, 45.0)?;
        non_negative("clearance", self.clearance)?;
        non_negative("backlash", self.backlash)?;
        positive_opt("hub_diameter", self.hub_diameter)?;
        positive_opt("hub_length", self.hub_length)?;

        let root = self.root_diameter();
        if self.bore >= root {
            return Err(ValidationError::new(
                "bore",
                format!("must be smaller than the root diameter ({:.2})", root),
            ));
        }
        if let Some(hub) = self.hub_diameter
            && hub <= self.bore
        {
            return Err(ValidationError::new(
                "hub_diameter",
                format!("must be larger than the bore ({})", self.bore),
            ));
        }
        Ok(())
    }

    /// Root (dedendum) diameter for a standard full-depth tooth
    pub fn root_diameter(&self) -> f64 {
        root_diameter(self.module, self.teeth)
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::SpurGear {
            module: self.module,
            teeth: self.teeth,
            width: self.width,
            bore: self.bore,
            pressure_angle: self.pressure_angle,
            clearance: self.clearance,
            backlash: self.backlash,
            hub_diameter: self.hub_diameter,
            hub_length: self.hub_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BevelGearParameters {
    pub module: f64,
    pub teeth: u32,
    pub cone_angle: f64,
    #[serde(default = "default_pressure_angle")]
    pub pressure_angle: f64,
    #[serde(default)]
    pub helix_angle: f64,
    #[serde(default)]
    pub bore: f64,
    #[serde(default)]
    pub clearance: f64,
    #[serde(default)]
    pub backlash: f64,
    pub face_width: f64,
}

impl BevelGearParameters {
    pub fn new(
        module: f64,
        teeth: u32,
        cone_angle: f64,
        face_width: f64,
    ) -> Result<Self, ValidationError> {
        let p = Self {
            module,
            teeth,
            cone_angle,
            pressure_angle: default_pressure_angle(),
            helix_angle: 0.0,
            bore: 0.0,
            clearance: 0.0,
            backlash: 0.0,
            face_width,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("module", self.module)?;
        check_teeth(self.teeth)?;
        in_range("cone_angle", self.cone_angle, 0.0, 90.0)?;
        in_range("pressure_angle", self.pressure_angle, 0.0, 45.0)?;
        in_range("helix_angle", self.helix_angle, 0.0, 180.0)?;
        non_negative("bore", self.bore)?;
        non_negative("clearance", self.clearance)?;
        non_negative("backlash", self.backlash)?;
        positive("face_width", self.face_width)?;

        let pitch = self.pitch_diameter();
        if self.bore >= pitch {
            return Err(ValidationError::new(
                "bore",
                format!("must be smaller than the pitch diameter ({:.2})", pitch),
            ));
        }
        Ok(())
    }

    pub fn pitch_diameter(&self) -> f64 {
        self.module * self.teeth as f64
    }

    pub fn to_primitive(&self) -> Primitive {
        Primitive::BevelGear {
            module: self.module,
            teeth: self.teeth,
            cone_angle: self.cone_angle,
            pressure_angle: self.pressure_angle,
            helix_angle: self.helix_angle,
            bore: self.bore,
            clearance: self.clearance,
            backlash: self.backlash,
            face_width: self.face_width,
        }
    }
}

fn root_diameter(module: f64, teeth: u32) -> f64 {
    module * (teeth as f64 - 2.5)
}

fn check_teeth(teeth: u32) -> Result<(), ValidationError> {
    if teeth >= 3 {
        Ok(())
    } else {
        Err(ValidationError::new(
            "teeth",
            format!("must be at least 3, got {}", teeth),
        ))
    }
}
