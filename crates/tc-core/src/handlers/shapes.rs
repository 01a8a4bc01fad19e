//! Handlers for the basic primitive shapes

use super::{ShapeHandler, mismatch};
use crate::error::ValidationError;
use crate::model::Parameters;

/// Rectangular box, the only shape synthesized with features
pub struct BoxHandler;

impl ShapeHandler for BoxHandler {
    fn name(&self) -> &'static str {
        "box"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["box"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Box(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

pub struct CylinderHandler;

impl ShapeHandler for CylinderHandler {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["cylinder"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Cylinder(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

pub struct SphereHandler;

impl ShapeHandler for SphereHandler {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["sphere"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Sphere(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

pub struct ConeHandler;

impl ShapeHandler for ConeHandler {
    fn name(&self) -> &'static str {
        "cone"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["cone"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Cone(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

pub struct TorusHandler;

impl ShapeHandler for TorusHandler {
    fn name(&self) -> &'static str {
        "torus"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["torus"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Torus(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

pub struct WedgeHandler;

impl ShapeHandler for WedgeHandler {
    fn name(&self) -> &'static str {
        "wedge"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["wedge"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::Wedge(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}
