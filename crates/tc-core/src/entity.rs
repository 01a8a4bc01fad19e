//! Labeled text spans produced by an entity extractor

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A labeled span of the input prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Byte offset of the span start
    pub start: usize,
    /// Byte offset of the span end
    pub end: usize,
    pub label: String,
    pub text: String,
}

impl Entity {
    pub fn new(start: usize, end: usize, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            text: text.into(),
        }
    }

    /// The label as a known vocabulary entry
    pub fn kind(&self) -> Label {
        Label::parse(&self.label)
    }
}

/// Entity label vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    ShapeType,
    ShapeDimension,
    Unit,
    FeatureCount,
    Feature,
    HoleDiameter,
    HoleCornerOffset,
    GearTeeth,
    /// A label outside the vocabulary
    Other(String),
}

impl Label {
    /// Match a label string, ignoring ASCII case
    pub fn parse(label: &str) -> Label {
        const KNOWN: [(&str, Label); 8] = [
            ("SHAPE_TYPE", Label::ShapeType),
            ("SHAPE_DIMENSION", Label::ShapeDimension),
            ("UNIT", Label::Unit),
            ("FEATURE_COUNT", Label::FeatureCount),
            ("FEATURE", Label::Feature),
            ("HOLE_DIAMETER", Label::HoleDiameter),
            ("HOLE_CORNER_OFFSET", Label::HoleCornerOffset),
            ("GEAR_TEETH", Label::GearTeeth),
        ];

        let label = label.trim();
        KNOWN
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, kind)| kind)
            .unwrap_or_else(|| Label::Other(label.to_string()))
    }
}

/// Failure reported by an entity extractor
#[derive(Debug, Clone, Error)]
#[error("Entity extraction failed: {0}")]
pub struct ExtractionError(pub String);

/// Turns free text into an ordered list of entities
///
/// Implementations live outside this crate (NER models, rule engines).
pub trait EntityExtractor: Send + Sync {
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, ExtractionError>;
}
