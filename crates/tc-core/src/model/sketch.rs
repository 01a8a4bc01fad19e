//! 2D sketch description carried by a configuration
//!
//! Sketches are modeled so configurations round-trip without loss. They are
//! not executed by the composition engine.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<SketchElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Constraint>>,
}

impl Sketch {
    pub fn is_empty(&self) -> bool {
        self.elements.as_ref().is_none_or(Vec::is_empty)
            && self.constraints.as_ref().is_none_or(Vec::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SketchElement {
    Line {
        start: DVec2,
        end: DVec2,
    },
    Arc {
        center: DVec2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: DVec2,
        radius: f64,
    },
    Rectangle {
        corner1: DVec2,
        corner2: DVec2,
    },
    Polygon {
        points: Vec<DVec2>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    Coincident,
    Parallel,
    Perpendicular,
    Tangent,
    Horizontal,
    Vertical,
    Equal,
    Distance,
    Angle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "type")]
    pub kind: ConstraintType,
    pub elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sketch_roundtrip() {
        let json = r#"{
            "elements": [
                {"type": "circle", "center": [0, 0], "radius": 5},
                {"type": "line", "start": [0, 0], "end": [10, 0]}
            ],
            "constraints": [{"type": "horizontal", "elements": ["e1"]}]
        }"#;
        let sketch: Sketch = serde_json::from_str(json).unwrap();
        assert!(!sketch.is_empty());
        let back: Sketch = serde_json::from_value(serde_json::to_value(&sketch).unwrap()).unwrap();
        assert_eq!(back, sketch);
        assert!(Sketch::default().is_empty());
    }
}
