//! Configuration synthesis from raw parsed fields
//!
//! Synthesis never fails as a whole. A component that cannot be built is
//! dropped and the reason is returned as a warning next to the
//! configuration.

use crate::error::SynthesisError;
use crate::model::{
    BevelGearParameters, BoxParameters, CadConfiguration, CircularHole, ConeParameters,
    CylinderParameters, Feature, Gear, Metadata, Parameters, Shape, SphereParameters,
    SpurGearParameters, TorusParameters, WedgeParameters, corner_offset_positions,
};
use crate::parser::{RawDimension, RawFeatures, RawFieldAccumulator, leading_number};
use crate::units::Units;

/// Holes generated by a `holes` feature, one per corner
pub const CORNER_HOLE_COUNT: usize = 4;

const DEFAULT_TEETH: u32 = 10;
const DEFAULT_MODULE: f64 = 1.0;
const DEFAULT_SPUR_WIDTH_MM: f64 = 10.0;
const DEFAULT_BEVEL_FACE_WIDTH_MM: f64 = 5.0;
const DEFAULT_BEVEL_CONE_ANGLE: f64 = 45.0;

/// Shape families a shape-type text can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Cylinder,
    Sphere,
    Cone,
    Torus,
    Wedge,
    SpurGear,
    BevelGear,
}

impl ShapeKind {
    /// Resolve a shape-type text, accepting common synonyms
    pub fn resolve(text: &str) -> Option<ShapeKind> {
        let text = text.trim().to_ascii_lowercase();
        let kind = match text.as_str() {
            "box" | "cube" | "plate" => ShapeKind::Box,
            "cylinder" => ShapeKind::Cylinder,
            "sphere" => ShapeKind::Sphere,
            "cone" => ShapeKind::Cone,
            "torus" => ShapeKind::Torus,
            "wedge" => ShapeKind::Wedge,
            "spur gear" | "spur_gear" | "gear" => ShapeKind::SpurGear,
            "bevel gear" | "bevel_gear" => ShapeKind::BevelGear,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cone => "cone",
            ShapeKind::Torus => "torus",
            ShapeKind::Wedge => "wedge",
            ShapeKind::SpurGear => "spur_gear",
            ShapeKind::BevelGear => "bevel_gear",
        }
    }

    pub fn is_gear(&self) -> bool {
        matches!(self, ShapeKind::SpurGear | ShapeKind::BevelGear)
    }
}

/// A synthesized configuration and everything that was dropped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub configuration: CadConfiguration,
    pub warnings: Vec<String>,
}

enum Component {
    Shape(Shape),
    Gear(Gear),
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{}", message);
    warnings.push(message);
}

/// Convert a raw dimension to millimeters.
///
/// With `halve_diameter`, a value whose text mentions a diameter is halved
/// to a radius first.
fn length_mm(dimension: &RawDimension, halve_diameter: bool) -> Result<f64, SynthesisError> {
    let mut value = leading_number(&dimension.value)
        .ok_or_else(|| SynthesisError::InvalidNumber(dimension.value.clone()))?;
    if halve_diameter && dimension.value.to_ascii_lowercase().contains("diameter") {
        value /= 2.0;
    }
    Ok(Units::convert_to_mm(
        value,
        dimension.unit.as_deref().unwrap_or("mm"),
    ))
}

fn require_at_least(
    dimensions: &[RawDimension],
    shape: &'static str,
    expected: &'static str,
    min: usize,
) -> Result<(), SynthesisError> {
    if dimensions.len() < min {
        return Err(SynthesisError::Arity {
            shape,
            expected,
            got: dimensions.len(),
        });
    }
    Ok(())
}

/// Builds a [`CadConfiguration`] from a [`RawFieldAccumulator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationSynthesizer;

impl ConfigurationSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, raw: RawFieldAccumulator) -> Synthesis {
        let mut warnings = raw.warnings.clone();

        let metadata = Metadata {
            name: Some("Generated CAD Model".to_string()),
            description: Some("Auto-generated from entity stream".to_string()),
            version: Some("1.0".to_string()),
            units: Self::primary_unit(&raw.dimensions),
        };
        let mut configuration = CadConfiguration {
            metadata,
            ..Default::default()
        };

        match raw.shape_type.as_deref() {
            None => warn(&mut warnings, "No shape type found in entities".to_string()),
            Some(text) => match self.build_component(text, &raw, &mut warnings) {
                Ok(Component::Shape(shape)) => configuration.shapes.push(shape),
                Ok(Component::Gear(gear)) => configuration.gears = Some(vec![gear]),
                Err(err) => warn(&mut warnings, format!("Dropped '{}': {}", text, err)),
            },
        }

        tracing::info!(
            shapes = configuration.shapes.len(),
            gears = configuration.gears().len(),
            warnings = warnings.len(),
            "Synthesized configuration"
        );

        Synthesis {
            configuration,
            warnings,
        }
    }

    /// The unit of the first dimension carrying a recognized unit
    fn primary_unit(dimensions: &[RawDimension]) -> Units {
        dimensions
            .iter()
            .filter_map(|d| d.unit.as_deref())
            .find_map(Units::parse)
            .unwrap_or_default()
    }

    fn build_component(
        &self,
        shape_type: &str,
        raw: &RawFieldAccumulator,
        warnings: &mut Vec<String>,
    ) -> Result<Component, SynthesisError> {
        let kind = ShapeKind::resolve(shape_type)
            .ok_or_else(|| SynthesisError::UnresolvedShape(shape_type.to_string()))?;
        let dims = raw.dimensions.as_slice();

        if kind != ShapeKind::Box
            && let Some(feature) = &raw.features.kind
        {
            warn(
                warnings,
                format!(
                    "Feature '{}' is only supported on boxes; ignored for {}",
                    feature,
                    kind.name()
                ),
            );
        }

        let parameters = match kind {
            ShapeKind::Box => Parameters::Box(self.box_parameters(dims, &raw.features, warnings)?),
            ShapeKind::Cylinder => {
                require_at_least(dims, "cylinder", "at least 2", 2)?;
                Parameters::Cylinder(CylinderParameters::new(
                    length_mm(&dims[0], true)?,
                    length_mm(&dims[1], false)?,
                )?)
            }
            ShapeKind::Sphere => {
                require_at_least(dims, "sphere", "at least 1", 1)?;
                Parameters::Sphere(SphereParameters::new(length_mm(&dims[0], true)?)?)
            }
            ShapeKind::Cone => {
                require_at_least(dims, "cone", "at least 3", 3)?;
                Parameters::Cone(ConeParameters::new(
                    length_mm(&dims[0], false)?,
                    length_mm(&dims[1], false)?,
                    length_mm(&dims[2], false)?,
                )?)
            }
            ShapeKind::Torus => {
                require_at_least(dims, "torus", "at least 2", 2)?;
                Parameters::Torus(TorusParameters::new(
                    length_mm(&dims[0], false)?,
                    length_mm(&dims[1], false)?,
                )?)
            }
            ShapeKind::Wedge => {
                require_at_least(dims, "wedge", "at least 3", 3)?;
                Parameters::Wedge(WedgeParameters::new(
                    length_mm(&dims[0], false)?,
                    length_mm(&dims[1], false)?,
                    length_mm(&dims[2], false)?,
                )?)
            }
            ShapeKind::SpurGear => {
                let width = match dims.first() {
                    Some(d) => length_mm(d, false)?,
                    None => DEFAULT_SPUR_WIDTH_MM,
                };
                Parameters::SpurGear(SpurGearParameters::new(
                    DEFAULT_MODULE,
                    Self::teeth(&raw.features, warnings),
                    width,
                )?)
            }
            ShapeKind::BevelGear => {
                let face_width = match dims.first() {
                    Some(d) => length_mm(d, false)?,
                    None => DEFAULT_BEVEL_FACE_WIDTH_MM,
                };
                Parameters::BevelGear(BevelGearParameters::new(
                    DEFAULT_MODULE,
                    Self::teeth(&raw.features, warnings),
                    DEFAULT_BEVEL_CONE_ANGLE,
                    face_width,
                )?)
            }
        };

        tracing::debug!(kind = kind.name(), "Built component parameters");

        if kind.is_gear() {
            Ok(Component::Gear(Gear::new(parameters)?))
        } else {
            Ok(Component::Shape(Shape::new(parameters)?))
        }
    }

    /// Tooth count from the raw fields; a count that is not a positive
    /// whole number falls back to the default with a warning.
    fn teeth(features: &RawFeatures, warnings: &mut Vec<String>) -> u32 {
        match features.teeth {
            None => DEFAULT_TEETH,
            Some(t) if t >= 1.0 && t.fract() == 0.0 && t <= u32::MAX as f64 => t as u32,
            Some(t) => {
                warn(
                    warnings,
                    format!(
                        "Gear teeth {} is not a positive whole number; using {}",
                        t, DEFAULT_TEETH
                    ),
                );
                DEFAULT_TEETH
            }
        }
    }

    fn box_parameters(
        &self,
        dims: &[RawDimension],
        features: &RawFeatures,
        warnings: &mut Vec<String>,
    ) -> Result<BoxParameters, SynthesisError> {
        let params = match dims {
            [side] => BoxParameters::cube(length_mm(side, false)?)?,
            [l, w, h] => {
                BoxParameters::new(length_mm(l, false)?, length_mm(w, false)?, length_mm(h, false)?)?
            }
            _ => {
                return Err(SynthesisError::Arity {
                    shape: "box",
                    expected: "1 or 3",
                    got: dims.len(),
                });
            }
        };

        let holes = self.corner_holes(features, params.length, params.width, warnings);
        Ok(params.with_features(holes)?)
    }

    /// Four through holes inset from the corners of the top face
    fn corner_holes(
        &self,
        features: &RawFeatures,
        length: f64,
        width: f64,
        warnings: &mut Vec<String>,
    ) -> Vec<Feature> {
        match features.kind.as_deref() {
            None => return Vec::new(),
            Some(kind) if kind.eq_ignore_ascii_case("holes") => {}
            Some(kind) => {
                warn(warnings, format!("Unsupported feature '{}'; ignored", kind));
                return Vec::new();
            }
        }

        if let Some(count) = &features.count {
            match leading_number(count) {
                Some(n) if n == CORNER_HOLE_COUNT as f64 => {}
                _ => warn(
                    warnings,
                    format!(
                        "Hole count '{}' ignored; generating {} corner holes",
                        count, CORNER_HOLE_COUNT
                    ),
                ),
            }
        }

        let (Some(diameter), Some(offset)) = (&features.diameter, &features.corner_offset) else {
            warn(
                warnings,
                "Holes need both a diameter and a corner offset; dropped".to_string(),
            );
            return Vec::new();
        };

        match Self::hole_features(length, width, diameter, offset) {
            Ok(holes) => holes,
            Err(err) => {
                warn(warnings, format!("Holes dropped: {}", err));
                Vec::new()
            }
        }
    }

    fn hole_features(
        length: f64,
        width: f64,
        diameter: &RawDimension,
        offset: &RawDimension,
    ) -> Result<Vec<Feature>, SynthesisError> {
        let diameter = length_mm(diameter, false)?;
        let offset = length_mm(offset, false)?;
        let mut holes = Vec::with_capacity(CORNER_HOLE_COUNT);
        for position in corner_offset_positions(length, width, offset) {
            holes.push(Feature::CircularHole(CircularHole::new(position, diameter)?));
        }
        Ok(holes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::parser::EntityStreamParser;
    use approx::assert_relative_eq;
    use glam::DVec2;

    fn synthesize(entities: &[(&str, &str)]) -> Synthesis {
        let entities: Vec<Entity> = entities
            .iter()
            .map(|(label, text)| Entity::new(0, 0, *label, *text))
            .collect();
        let raw = EntityStreamParser::new().parse(&entities);
        ConfigurationSynthesizer::new().synthesize(raw)
    }

    fn only_shape(synthesis: &Synthesis) -> &Parameters {
        assert_eq!(synthesis.configuration.shapes.len(), 1, "{:?}", synthesis.warnings);
        synthesis.configuration.shapes[0].parameters()
    }

    #[test]
    fn test_resolve_synonyms() {
        assert_eq!(ShapeKind::resolve("Cube"), Some(ShapeKind::Box));
        assert_eq!(ShapeKind::resolve(" plate "), Some(ShapeKind::Box));
        assert_eq!(ShapeKind::resolve("spur gear"), Some(ShapeKind::SpurGear));
        assert_eq!(ShapeKind::resolve("BEVEL_GEAR"), Some(ShapeKind::BevelGear));
        assert_eq!(ShapeKind::resolve("pyramid"), None);
    }

    #[test]
    fn test_cube_from_single_dimension() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "cube"),
            ("SHAPE_DIMENSION", "2"),
            ("UNIT", "cm"),
        ]);
        let Parameters::Box(p) = only_shape(&s) else {
            panic!("expected a box");
        };
        assert_eq!((p.length, p.width, p.height), (20.0, 20.0, 20.0));
        assert_eq!(s.configuration.metadata.units, Units::Cm);
    }

    #[test]
    fn test_box_needs_one_or_three_dimensions() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "box"),
            ("SHAPE_DIMENSION", "2"),
            ("UNIT", "cm"),
            ("SHAPE_DIMENSION", "3"),
            ("UNIT", "cm"),
        ]);
        assert!(s.configuration.shapes.is_empty());
        assert!(s.warnings.iter().any(|w| w.contains("1 or 3")));
    }

    #[test]
    fn test_cylinder_diameter_is_halved() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "cylinder"),
            ("SHAPE_DIMENSION", "20 diameter"),
            ("UNIT", "mm"),
            ("SHAPE_DIMENSION", "50"),
            ("UNIT", "mm"),
        ]);
        let Parameters::Cylinder(p) = only_shape(&s) else {
            panic!("expected a cylinder");
        };
        assert_eq!(p.radius, 10.0);
        assert_eq!(p.height, 50.0);
    }

    #[test]
    fn test_cylinder_arity() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "cylinder"),
            ("SHAPE_DIMENSION", "20"),
            ("UNIT", "mm"),
        ]);
        assert!(s.configuration.shapes.is_empty());
        assert_eq!(s.warnings.len(), 1);
        assert!(s.warnings[0].contains("cylinder requires at least 2"));
    }

    #[test]
    fn test_unknown_shape_is_dropped() {
        let s = synthesize(&[("SHAPE_TYPE", "pyramid"), ("SHAPE_DIMENSION", "2")]);
        assert!(s.configuration.shapes.is_empty());
        assert!(s.warnings.iter().any(|w| w.contains("Unknown shape type")));
    }

    #[test]
    fn test_invalid_number_is_dropped() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "sphere"),
            ("SHAPE_DIMENSION", "big"),
            ("UNIT", "mm"),
        ]);
        assert!(s.configuration.shapes.is_empty());
        assert!(s.warnings.iter().any(|w| w.contains("Not a number")));
    }

    #[test]
    fn test_box_with_corner_holes() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "plate"),
            ("SHAPE_DIMENSION", "10"),
            ("UNIT", "cm"),
            ("SHAPE_DIMENSION", "6"),
            ("UNIT", "cm"),
            ("SHAPE_DIMENSION", "5"),
            ("UNIT", "mm"),
            ("FEATURE_COUNT", "4"),
            ("FEATURE", "holes"),
            ("HOLE_DIAMETER", "3"),
            ("UNIT", "mm"),
            ("HOLE_CORNER_OFFSET", "0.5"),
            ("UNIT", "cm"),
        ]);
        assert!(s.warnings.is_empty(), "{:?}", s.warnings);
        let Parameters::Box(p) = only_shape(&s) else {
            panic!("expected a box");
        };
        assert_eq!(p.features.len(), CORNER_HOLE_COUNT);
        let Feature::CircularHole(first) = &p.features[0] else {
            panic!("expected a circular hole");
        };
        assert_eq!(first.diameter, 3.0);
        assert_eq!(first.position, DVec2::new(45.0, 25.0));
        assert_eq!(first.depth, None);
    }

    #[test]
    fn test_hole_count_mismatch_still_makes_four() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "box"),
            ("SHAPE_DIMENSION", "40"),
            ("FEATURE_COUNT", "6"),
            ("FEATURE", "holes"),
            ("HOLE_DIAMETER", "2"),
            ("HOLE_CORNER_OFFSET", "4"),
        ]);
        let Parameters::Box(p) = only_shape(&s) else {
            panic!("expected a box");
        };
        assert_eq!(p.features.len(), 4);
        assert!(s.warnings.iter().any(|w| w.contains("Hole count '6'")));
    }

    #[test]
    fn test_holes_without_offset_keep_shape() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "box"),
            ("SHAPE_DIMENSION", "40"),
            ("UNIT", "mm"),
            ("FEATURE", "holes"),
            ("HOLE_DIAMETER", "2"),
            ("UNIT", "mm"),
        ]);
        let Parameters::Box(p) = only_shape(&s) else {
            panic!("expected a box");
        };
        assert!(p.features.is_empty());
        assert_eq!(s.warnings.len(), 1);
    }

    #[test]
    fn test_holes_on_cylinder_are_dropped() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "cylinder"),
            ("SHAPE_DIMENSION", "5"),
            ("UNIT", "mm"),
            ("SHAPE_DIMENSION", "10"),
            ("UNIT", "mm"),
            ("FEATURE", "holes"),
        ]);
        let Parameters::Cylinder(p) = only_shape(&s) else {
            panic!("expected a cylinder");
        };
        assert!(p.features.is_empty());
        assert!(s.warnings[0].contains("only supported on boxes"));
    }

    #[test]
    fn test_spur_gear_defaults() {
        let s = synthesize(&[("SHAPE_TYPE", "spur gear"), ("GEAR_TEETH", "24")]);
        assert!(s.configuration.shapes.is_empty());
        let gears = s.configuration.gears();
        assert_eq!(gears.len(), 1);
        let Parameters::SpurGear(p) = gears[0].parameters() else {
            panic!("expected a spur gear");
        };
        assert_eq!(p.teeth, 24);
        assert_eq!(p.width, 10.0);
        assert_eq!(p.module, 1.0);
        assert_eq!(p.bore, 5.0);
    }

    #[test]
    fn test_small_spur_gears_are_buildable() {
        use crate::handlers::ShapeHandlerRegistry;

        let registry = ShapeHandlerRegistry::new();
        for teeth in 3..=7 {
            let text = teeth.to_string();
            let s = synthesize(&[("SHAPE_TYPE", "spur gear"), ("GEAR_TEETH", text.as_str())]);
            assert!(s.warnings.is_empty(), "teeth {teeth}: {:?}", s.warnings);
            let params = s.configuration.gears()[0].parameters();
            assert!(
                registry.get("spur_gear").unwrap().validate(params).is_ok(),
                "teeth {teeth}"
            );
        }
    }

    #[test]
    fn test_invalid_teeth_fall_back_to_default() {
        for text in ["-3", "12.7", "0"] {
            let s = synthesize(&[("SHAPE_TYPE", "spur gear"), ("GEAR_TEETH", text)]);
            let Parameters::SpurGear(p) = s.configuration.gears()[0].parameters() else {
                panic!("expected a spur gear");
            };
            assert_eq!(p.teeth, DEFAULT_TEETH, "teeth '{text}'");
            assert_eq!(s.warnings.len(), 1, "teeth '{text}': {:?}", s.warnings);
            assert!(s.warnings[0].contains("positive whole number"));
        }
    }

    #[test]
    fn test_bevel_gear_width_from_dimension() {
        let s = synthesize(&[
            ("SHAPE_TYPE", "bevel gear"),
            ("SHAPE_DIMENSION", "0.5"),
            ("UNIT", "in"),
        ]);
        let Parameters::BevelGear(p) = s.configuration.gears()[0].parameters() else {
            panic!("expected a bevel gear");
        };
        assert_relative_eq!(p.face_width, 12.7);
        assert_eq!(p.cone_angle, 45.0);
        assert_eq!(p.teeth, 10);
    }

    #[test]
    fn test_missing_unit_defaults_to_mm() {
        let s = synthesize(&[("SHAPE_TYPE", "sphere"), ("SHAPE_DIMENSION", "8")]);
        let Parameters::Sphere(p) = only_shape(&s) else {
            panic!("expected a sphere");
        };
        assert_eq!(p.radius, 8.0);
        assert_eq!(s.configuration.metadata.units, Units::Mm);
        assert_eq!(s.warnings.len(), 1);
    }

    #[test]
    fn test_no_shape_type() {
        let s = synthesize(&[("SHAPE_DIMENSION", "8")]);
        assert!(s.configuration.shapes.is_empty());
        assert!(s.warnings.iter().any(|w| w.contains("No shape type")));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let entities = [
            ("SHAPE_TYPE", "box"),
            ("SHAPE_DIMENSION", "10"),
            ("UNIT", "cm"),
        ];
        assert_eq!(synthesize(&entities), synthesize(&entities));
        assert_eq!(synthesize(&entities).configuration.shapes[0].id, None);
    }
}
