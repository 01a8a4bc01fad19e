//! Placement of built components

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tc_cad::{CadKernel, CadResult, Solid};

/// Where the X, Y and Z rotation axes pass through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotMode {
    /// All three axes pass through the origin
    #[default]
    Origin,
    /// Axes pass through (0,0,0), (0,0,1) and (0,0,2), matching models
    /// produced by earlier releases
    Legacy,
}

impl PivotMode {
    /// Pivot points for the X, Y and Z rotations
    pub fn pivots(&self) -> [DVec3; 3] {
        match self {
            PivotMode::Origin => [DVec3::ZERO; 3],
            PivotMode::Legacy => [DVec3::ZERO, DVec3::Z, DVec3::new(0.0, 0.0, 2.0)],
        }
    }
}

/// Applies translation then Euler rotation to a solid
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformApplier {
    mode: PivotMode,
}

impl TransformApplier {
    pub fn new(mode: PivotMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PivotMode {
        self.mode
    }

    /// Translate by `position`, then rotate by `rotation` degrees about X, Y
    /// and Z in that order. Zero components are skipped.
    pub fn apply(
        &self,
        kernel: &dyn CadKernel,
        solid: Solid,
        position: DVec3,
        rotation: DVec3,
    ) -> CadResult<Solid> {
        let mut solid = solid;

        if position != DVec3::ZERO {
            solid = kernel.translate(&solid, position)?;
        }

        if rotation != DVec3::ZERO {
            let axes = [DVec3::X, DVec3::Y, DVec3::Z];
            for ((axis, pivot), degrees) in axes
                .into_iter()
                .zip(self.mode.pivots())
                .zip(rotation.to_array())
            {
                if degrees != 0.0 {
                    solid = kernel.rotate(&solid, pivot, axis, degrees)?;
                }
            }
        }

        Ok(solid)
    }
}
