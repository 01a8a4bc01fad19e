//! Gear handlers

use glam::DVec3;
use tc_cad::Solid;

use super::{BuildContext, ShapeHandler, mismatch};
use crate::error::{CompositionError, ValidationError};
use crate::model::Parameters;

/// Involute spur gear
pub struct SpurGearHandler;

impl ShapeHandler for SpurGearHandler {
    fn name(&self) -> &'static str {
        "spur_gear"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["spur_gear", "spur"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::SpurGear(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }

    fn create(
        &self,
        ctx: &BuildContext<'_>,
        parameters: &Parameters,
        position: DVec3,
        rotation: DVec3,
    ) -> Result<Solid, CompositionError> {
        self.validate(parameters)?;
        if let Parameters::SpurGear(p) = parameters
            && p.hub_diameter.is_some() != p.hub_length.is_some()
        {
            tracing::warn!("Spur gear hub needs both a diameter and a length; hub skipped");
        }
        ctx.build(&parameters.to_primitive(), &[], position, rotation)
    }
}

/// Straight or spiral bevel gear
pub struct BevelGearHandler;

impl ShapeHandler for BevelGearHandler {
    fn name(&self) -> &'static str {
        "bevel_gear"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["bevel_gear", "bevel"]
    }

    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        match parameters {
            Parameters::BevelGear(p) => p.validate(),
            other => Err(mismatch(self.name(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BevelGearParameters, SpurGearParameters};
    use crate::transform::TransformApplier;
    use tc_cad::{CadKernel, EnvelopeKernel};

    #[test]
    fn test_spur_gear_bore_must_fit() {
        let mut gear = SpurGearParameters::new(1.0, 10, 8.0).unwrap();
        assert!(SpurGearHandler.validate(&Parameters::SpurGear(gear.clone())).is_ok());

        gear.bore = 8.0;
        let err = SpurGearHandler
            .validate(&Parameters::SpurGear(gear))
            .unwrap_err();
        assert_eq!(err.field, "bore");
    }

    #[test]
    fn test_spur_gear_hub_must_exceed_bore() {
        let mut gear = SpurGearParameters::new(2.0, 20, 8.0).unwrap();
        gear.hub_diameter = Some(4.0);
        gear.hub_length = Some(5.0);
        let err = SpurGearHandler
            .validate(&Parameters::SpurGear(gear))
            .unwrap_err();
        assert_eq!(err.field, "hub_diameter");
    }

    #[test]
    fn test_spur_gear_envelope() {
        let kernel = EnvelopeKernel::new();
        let ctx = BuildContext::new(&kernel, TransformApplier::default());
        let params = Parameters::SpurGear(SpurGearParameters::new(2.0, 20, 8.0).unwrap());
        let solid = SpurGearHandler
            .create(&ctx, &params, DVec3::ZERO, DVec3::ZERO)
            .unwrap();
        let bounds = kernel.bounding_box(&solid).unwrap().unwrap();
        // Tip diameter is m * (z + 2)
        assert_eq!(bounds.size(), DVec3::new(44.0, 44.0, 8.0));
    }

    #[test]
    fn test_bevel_gear_handler() {
        let params = Parameters::BevelGear(BevelGearParameters::new(1.0, 12, 45.0, 5.0).unwrap());
        assert!(BevelGearHandler.validate(&params).is_ok());

        let spur = Parameters::SpurGear(SpurGearParameters::new(1.0, 12, 5.0).unwrap());
        assert_eq!(BevelGearHandler.validate(&spur).unwrap_err().field, "type");
    }
}
