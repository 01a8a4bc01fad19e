//! Feature application on built primitives

use tc_cad::{CadKernel, Solid};

use crate::error::CompositionError;
use crate::model::Feature;

/// Cuts features into a solid, one after another
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureApplier;

impl FeatureApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        kernel: &dyn CadKernel,
        solid: Solid,
        features: &[Feature],
    ) -> Result<Solid, CompositionError> {
        let mut solid = solid;
        for feature in features {
            feature.validate()?;
            solid = match feature {
                Feature::CircularHole(hole) => {
                    tracing::debug!(
                        face = %hole.face,
                        position = ?hole.position,
                        diameter = hole.diameter,
                        "Cutting circular hole"
                    );
                    kernel.cut_hole(&solid, hole.face, hole.position, hole.diameter, hole.depth)?
                }
                other => return Err(CompositionError::NotImplementedFeature(other.kind())),
            };
        }
        Ok(solid)
    }
}
