//! Entity stream parsing
//!
//! A single forward pass over labeled entities collects the raw, still
//! textual fields a configuration is synthesized from.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Label};

/// A numeric text with the unit that followed it, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDimension {
    pub value: String,
    pub unit: Option<String>,
}

/// Raw feature fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub count: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub diameter: Option<RawDimension>,
    pub corner_offset: Option<RawDimension>,
    pub teeth: Option<f64>,
}

/// Everything one parse pass collected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFieldAccumulator {
    pub shape_type: Option<String>,
    pub dimensions: Vec<RawDimension>,
    pub features: RawFeatures,
    /// Recovered problems, in input order
    pub warnings: Vec<String>,
}

impl RawFieldAccumulator {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Extract the first numeric token of a text (`"20"`, `"20mm"`, `"approx -1.5 cm"`)
pub fn leading_number(text: &str) -> Option<f64> {
    let digits = text.find(|c: char| c.is_ascii_digit())?;
    let mut start = digits;
    if text[..start].ends_with('.') {
        start -= 1;
    }
    if text[..start].ends_with('-') {
        start -= 1;
    }
    let len = text[digits..]
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len() - digits);
    text[start..digits + len].parse().ok()
}

/// Converts an ordered entity list into a [`RawFieldAccumulator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityStreamParser;

impl EntityStreamParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, entities: &[Entity]) -> RawFieldAccumulator {
        let mut acc = RawFieldAccumulator::default();
        let mut cursor = 0;

        while cursor < entities.len() {
            let entity = &entities[cursor];
            cursor = match entity.kind() {
                Label::ShapeType => {
                    acc.shape_type = Some(entity.text.trim().to_string());
                    cursor + 1
                }
                Label::ShapeDimension => {
                    let (dimension, next) = Self::take_with_unit(entities, cursor);
                    if dimension.unit.is_none() {
                        acc.warn(format!("Dimension '{}' has no unit", dimension.value));
                    } else {
                        tracing::debug!(
                            value = %dimension.value,
                            unit = ?dimension.unit,
                            "Paired dimension with unit"
                        );
                    }
                    acc.dimensions.push(dimension);
                    next
                }
                Label::FeatureCount => {
                    acc.features.count = Some(entity.text.trim().to_string());
                    cursor + 1
                }
                Label::Feature => {
                    acc.features.kind = Some(entity.text.trim().to_string());
                    cursor + 1
                }
                Label::HoleDiameter => {
                    let (diameter, next) = Self::take_with_unit(entities, cursor);
                    acc.features.diameter = Some(diameter);
                    next
                }
                Label::HoleCornerOffset => {
                    let (offset, next) = Self::take_with_unit(entities, cursor);
                    acc.features.corner_offset = Some(offset);
                    next
                }
                Label::GearTeeth => {
                    match leading_number(&entity.text) {
                        Some(teeth) => acc.features.teeth = Some(teeth),
                        None => acc.warn(format!(
                            "Gear teeth '{}' is not a number; ignored",
                            entity.text
                        )),
                    }
                    cursor + 1
                }
                Label::Unit | Label::Other(_) => cursor + 1,
            };
        }

        acc
    }

    /// Read the value at `index` and the unit right after it, if there is one
    fn take_with_unit(entities: &[Entity], index: usize) -> (RawDimension, usize) {
        let value = entities[index].text.trim().to_string();
        match entities.get(index + 1) {
            Some(next) if next.kind() == Label::Unit => (
                RawDimension {
                    value,
                    unit: Some(next.text.trim().to_string()),
                },
                index + 2,
            ),
            _ => (RawDimension { value, unit: None }, index + 1),
        }
    }
}
