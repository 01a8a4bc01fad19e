//! Operations applied to the composed solid after all components are built

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tc_cad::{Face, MirrorPlane};

use super::check::{finite, positive, positive_opt};
use crate::error::ValidationError;

/// Kind of a post-composition operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Union,
    Cut,
    Intersect,
    Fillet,
    Chamfer,
    Shell,
    Mirror,
    Array,
    Pattern,
}

impl OperationType {
    pub const ALL: [OperationType; 9] = [
        OperationType::Union,
        OperationType::Cut,
        OperationType::Intersect,
        OperationType::Fillet,
        OperationType::Chamfer,
        OperationType::Shell,
        OperationType::Mirror,
        OperationType::Array,
        OperationType::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Union => "union",
            OperationType::Cut => "cut",
            OperationType::Intersect => "intersect",
            OperationType::Fillet => "fillet",
            OperationType::Chamfer => "chamfer",
            OperationType::Shell => "shell",
            OperationType::Mirror => "mirror",
            OperationType::Array => "array",
            OperationType::Pattern => "pattern",
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            OperationType::Union | OperationType::Cut | OperationType::Intersect
        )
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation referencing components by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<OperationParameters>,
}

impl Operation {
    pub fn new(kind: OperationType, targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            targets: targets.into_iter().map(Into::into).collect(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: OperationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Extra component id named by boolean parameters
    pub fn tool(&self) -> Option<&str> {
        match &self.parameters {
            Some(OperationParameters::Boolean(b)) => Some(&b.tool),
            _ => None,
        }
    }

    /// Check that the parameters match the operation type and are in bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        use OperationParameters as P;
        use OperationType as T;

        let mismatch = |expected: &str| {
            ValidationError::new(
                "parameters",
                format!("{} operation requires {} parameters", self.kind, expected),
            )
        };

        match (self.kind, &self.parameters) {
            (T::Union | T::Cut | T::Intersect, None) => {
                if self.targets.is_empty() {
                    return Err(ValidationError::new(
                        "targets",
                        format!("{} operation needs a target or a tool", self.kind),
                    ));
                }
                Ok(())
            }
            (T::Union | T::Cut | T::Intersect, Some(P::Boolean(_))) => Ok(()),
            (T::Fillet, Some(P::Fillet(p))) => positive("radius", p.radius),
            (T::Chamfer, Some(P::Chamfer(p))) => positive("length", p.length),
            (T::Shell, Some(P::Shell(p))) => positive("thickness", p.thickness),
            (T::Mirror, None | Some(P::Mirror(_))) => self.require_targets(),
            (T::Array, Some(P::Array(p))) => {
                self.require_targets()?;
                p.validate()
            }
            (T::Pattern, Some(P::Pattern(p))) => {
                self.require_targets()?;
                p.validate()
            }
            (T::Union | T::Cut | T::Intersect, _) => Err(mismatch("boolean")),
            (T::Mirror, _) => Err(mismatch("mirror")),
            (kind, _) => Err(mismatch(kind.as_str())),
        }
    }

    fn require_targets(&self) -> Result<(), ValidationError> {
        if self.targets.is_empty() {
            Err(ValidationError::new(
                "targets",
                format!("{} operation needs at least one target", self.kind),
            ))
        } else {
            Ok(())
        }
    }
}

/// Operation parameters, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationParameters {
    Boolean(BooleanParameters),
    Fillet(FilletParameters),
    Chamfer(ChamferParameters),
    Shell(ShellParameters),
    Array(ArrayParameters),
    Pattern(PatternParameters),
    Mirror(MirrorParameters),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanParameters {
    /// Id of an additional component used as the tool
    pub tool: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilletParameters {
    pub radius: f64,
    #[serde(default)]
    pub edges: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamferParameters {
    pub length: f64,
    #[serde(default)]
    pub edges: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellParameters {
    pub thickness: f64,
    /// Faces left open, none means a closed hollow
    #[serde(default)]
    pub faces: Option<Vec<Face>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayParameters {
    pub count: u32,
    pub spacing: DVec3,
}

impl ArrayParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.count <= 1 {
            return Err(ValidationError::new(
                "count",
                format!("must be greater than 1, got {}", self.count),
            ));
        }
        if !self.spacing.is_finite() {
            return Err(ValidationError::new("spacing", "must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Linear,
    Circular,
    Rectangular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternParameters {
    pub pattern_type: PatternType,
    pub count: u32,
    #[serde(default)]
    pub spacing: Option<f64>,
    /// Angle between circular copies, zero spreads them over a full turn
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub center: Option<DVec3>,
}

impl PatternParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.count < 1 {
            return Err(ValidationError::new("count", "must be at least 1"));
        }
        positive_opt("spacing", self.spacing)?;
        finite("angle", self.angle)?;
        if matches!(
            self.pattern_type,
            PatternType::Linear | PatternType::Rectangular
        ) && self.spacing.is_none()
        {
            return Err(ValidationError::new(
                "spacing",
                "required for linear and rectangular patterns",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorParameters {
    #[serde(default)]
    pub plane: MirrorPlane,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_without_parameters() {
        let op = Operation::new(OperationType::Cut, ["shape_1"]);
        assert!(op.validate().is_ok());
        assert_eq!(op.tool(), None);

        let empty = Operation::new(OperationType::Union, Vec::<String>::new());
        assert_eq!(empty.validate().unwrap_err().field, "targets");
    }

    #[test]
    fn test_parameters_must_match_type() {
        let op = Operation::new(OperationType::Fillet, ["shape_0"]).with_parameters(
            OperationParameters::Chamfer(ChamferParameters {
                length: 1.0,
                edges: None,
            }),
        );
        assert_eq!(op.validate().unwrap_err().field, "parameters");

        let missing = Operation::new(OperationType::Shell, ["shape_0"]);
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_array_count_bound() {
        let op = Operation::new(OperationType::Array, ["shape_0"]).with_parameters(
            OperationParameters::Array(ArrayParameters {
                count: 1,
                spacing: DVec3::X,
            }),
        );
        assert_eq!(op.validate().unwrap_err().field, "count");
    }

    #[test]
    fn test_linear_pattern_needs_spacing() {
        let params = PatternParameters {
            pattern_type: PatternType::Linear,
            count: 3,
            spacing: None,
            angle: 0.0,
            center: None,
        };
        assert_eq!(params.validate().unwrap_err().field, "spacing");
    }

    #[test]
    fn test_operation_json() {
        let json = r#"{
            "type": "union",
            "targets": ["shape_0"],
            "parameters": {"type": "boolean", "tool": "shape_1"}
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.kind, OperationType::Union);
        assert_eq!(op.tool(), Some("shape_1"));

        let shell: Operation = serde_json::from_str(
            r#"{"type": "shell", "targets": [], "parameters": {"type": "shell", "thickness": 1.5, "faces": [">Z"]}}"#,
        )
        .unwrap();
        assert!(shell.validate().is_ok());
        let Some(OperationParameters::Shell(p)) = &shell.parameters else {
            panic!("expected shell parameters");
        };
        assert_eq!(p.faces.as_deref(), Some(&[Face::PosZ][..]));
    }
}
