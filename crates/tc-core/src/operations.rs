//! Post-composition operations
//!
//! Operations act on the accumulated solid. Targets name components built
//! earlier in the same request.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;
use tc_cad::{BooleanType, CadKernel, Face, MirrorPlane, Solid};

use crate::error::{CompositionError, ValidationError};
use crate::model::{Operation, OperationParameters, OperationType, PatternType};

/// What an operation handler works with
pub struct OperationInput<'a> {
    pub kernel: &'a dyn CadKernel,
    /// Resolved targets, in the order the operation lists them
    pub targets: &'a [Solid],
    components: &'a HashMap<String, Solid>,
}

impl<'a> OperationInput<'a> {
    pub fn new(
        kernel: &'a dyn CadKernel,
        targets: &'a [Solid],
        components: &'a HashMap<String, Solid>,
    ) -> Self {
        Self {
            kernel,
            targets,
            components,
        }
    }

    /// Look up another component by id
    pub fn resolve(&self, id: &str) -> Result<Solid, CompositionError> {
        self.components
            .get(id)
            .copied()
            .ok_or_else(|| CompositionError::UnresolvedTarget(id.to_string()))
    }

    fn union(&self, a: Solid, b: Solid) -> Result<Solid, CompositionError> {
        Ok(self.kernel.boolean(&a, &b, BooleanType::Union)?)
    }
}

/// Applies one or more operation types to the accumulated solid
pub trait OperationHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn supported_types(&self) -> &'static [OperationType];

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError>;
}

fn missing_parameters(operation: &Operation) -> CompositionError {
    ValidationError::new(
        "parameters",
        format!("{} operation requires parameters", operation.kind),
    )
    .into()
}

/// Union, cut and intersect of the targets (and boolean tool) with the accumulator
pub struct BooleanOperation;

impl OperationHandler for BooleanOperation {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn supported_types(&self) -> &'static [OperationType] {
        &[
            OperationType::Union,
            OperationType::Cut,
            OperationType::Intersect,
        ]
    }

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError> {
        let op = match operation.kind {
            OperationType::Union => BooleanType::Union,
            OperationType::Cut => BooleanType::Subtract,
            OperationType::Intersect => BooleanType::Intersect,
            other => return Err(CompositionError::NoHandler(other.to_string())),
        };

        let mut operands = input.targets.to_vec();
        if let Some(tool) = operation.tool() {
            operands.push(input.resolve(tool)?);
        }

        let mut solid = accumulated;
        for operand in operands {
            solid = input.kernel.boolean(&solid, &operand, op)?;
        }
        Ok(solid)
    }
}

/// Fillet, chamfer and shell of the accumulated solid
pub struct ModifierOperation;

impl OperationHandler for ModifierOperation {
    fn name(&self) -> &'static str {
        "modifier"
    }

    fn supported_types(&self) -> &'static [OperationType] {
        &[
            OperationType::Fillet,
            OperationType::Chamfer,
            OperationType::Shell,
        ]
    }

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError> {
        let kernel = input.kernel;
        let solid = match (operation.kind, &operation.parameters) {
            (OperationType::Fillet, Some(OperationParameters::Fillet(p))) => {
                if p.edges.is_some() {
                    tracing::warn!("Edge selectors are not supported; filleting all edges");
                }
                kernel.fillet(&accumulated, p.radius)?
            }
            (OperationType::Chamfer, Some(OperationParameters::Chamfer(p))) => {
                if p.edges.is_some() {
                    tracing::warn!("Edge selectors are not supported; chamfering all edges");
                }
                kernel.chamfer(&accumulated, p.length)?
            }
            (OperationType::Shell, Some(OperationParameters::Shell(p))) => {
                let open: &[Face] = p.faces.as_deref().unwrap_or_default();
                kernel.shell(&accumulated, p.thickness, open)?
            }
            _ => return Err(missing_parameters(operation)),
        };
        Ok(solid)
    }
}

/// Mirrored copies of the targets, unioned into the accumulator
pub struct MirrorOperation;

impl OperationHandler for MirrorOperation {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn supported_types(&self) -> &'static [OperationType] {
        &[OperationType::Mirror]
    }

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError> {
        let plane = match &operation.parameters {
            Some(OperationParameters::Mirror(p)) => p.plane,
            _ => MirrorPlane::default(),
        };

        let mut solid = accumulated;
        for target in input.targets {
            let mirrored = input.kernel.mirror(target, plane)?;
            solid = input.union(solid, mirrored)?;
        }
        Ok(solid)
    }
}

/// Evenly spaced translated copies of the targets
pub struct ArrayOperation;

impl OperationHandler for ArrayOperation {
    fn name(&self) -> &'static str {
        "array"
    }

    fn supported_types(&self) -> &'static [OperationType] {
        &[OperationType::Array]
    }

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError> {
        let Some(OperationParameters::Array(p)) = &operation.parameters else {
            return Err(missing_parameters(operation));
        };

        let mut solid = accumulated;
        for target in input.targets {
            for i in 1..p.count {
                let copy = input.kernel.translate(target, p.spacing * i as f64)?;
                solid = input.union(solid, copy)?;
            }
        }
        Ok(solid)
    }
}

/// Linear, rectangular and circular patterns of the targets
pub struct PatternOperation;

impl PatternOperation {
    /// Offsets of the copies besides the source solid for a grid pattern
    fn grid_offsets(pattern_type: PatternType, count: u32, spacing: f64) -> Vec<DVec3> {
        match pattern_type {
            PatternType::Linear => (1..count)
                .map(|i| DVec3::X * spacing * i as f64)
                .collect(),
            PatternType::Rectangular => (0..count)
                .flat_map(|i| (0..count).map(move |j| (i, j)))
                .filter(|&(i, j)| (i, j) != (0, 0))
                .map(|(i, j)| DVec3::new(i as f64 * spacing, j as f64 * spacing, 0.0))
                .collect(),
            PatternType::Circular => Vec::new(),
        }
    }
}

impl OperationHandler for PatternOperation {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn supported_types(&self) -> &'static [OperationType] {
        &[OperationType::Pattern]
    }

    fn apply(
        &self,
        input: &OperationInput<'_>,
        accumulated: Solid,
        operation: &Operation,
    ) -> Result<Solid, CompositionError> {
        let Some(OperationParameters::Pattern(p)) = &operation.parameters else {
            return Err(missing_parameters(operation));
        };

        let mut solid = accumulated;
        for target in input.targets {
            if p.pattern_type == PatternType::Circular {
                let step = if p.angle != 0.0 {
                    p.angle
                } else {
                    360.0 / p.count as f64
                };
                let center = p.center.unwrap_or(DVec3::ZERO);
                for i in 1..p.count {
                    let copy = input
                        .kernel
                        .rotate(target, center, DVec3::Z, step * i as f64)?;
                    solid = input.union(solid, copy)?;
                }
            } else {
                let spacing = p.spacing.ok_or_else(|| {
                    CompositionError::from(ValidationError::new(
                        "spacing",
                        "required for linear and rectangular patterns",
                    ))
                })?;
                for offset in Self::grid_offsets(p.pattern_type, p.count, spacing) {
                    let copy = input.kernel.translate(target, offset)?;
                    solid = input.union(solid, copy)?;
                }
            }
        }
        Ok(solid)
    }
}

/// Handlers registered by default
pub fn default_operations() -> Vec<Box<dyn OperationHandler>> {
    vec![
        Box::new(BooleanOperation),
        Box::new(ModifierOperation),
        Box::new(MirrorOperation),
        Box::new(ArrayOperation),
        Box::new(PatternOperation),
    ]
}

/// Dispatch table from operation type to handler
pub struct OperationRegistry {
    handlers: HashMap<OperationType, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::from_handlers(default_operations())
    }

    /// Register handlers in order; later handlers replace earlier ones for
    /// shared operation types.
    pub fn from_handlers(handlers: impl IntoIterator<Item = Box<dyn OperationHandler>>) -> Self {
        let mut map: HashMap<OperationType, Arc<dyn OperationHandler>> = HashMap::new();
        for handler in handlers {
            let handler: Arc<dyn OperationHandler> = Arc::from(handler);
            for &kind in handler.supported_types() {
                if let Some(previous) = map.insert(kind, Arc::clone(&handler)) {
                    tracing::debug!(
                        %kind,
                        replaced = previous.name(),
                        by = handler.name(),
                        "Operation handler replaced"
                    );
                }
            }
        }
        Self { handlers: map }
    }

    pub fn get(&self, kind: OperationType) -> Result<&dyn OperationHandler, CompositionError> {
        self.handlers
            .get(&kind)
            .map(|h| h.as_ref())
            .ok_or_else(|| CompositionError::NoHandler(kind.to_string()))
    }

    pub fn supported_types(&self) -> Vec<OperationType> {
        OperationType::ALL
            .into_iter()
            .filter(|kind| self.handlers.contains_key(kind))
            .collect()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrayParameters, MirrorParameters, PatternParameters};
    use approx::assert_relative_eq;
    use tc_cad::{Aabb, EnvelopeKernel, Primitive};

    fn cube_at(kernel: &EnvelopeKernel, min: DVec3, size: f64) -> Solid {
        let cube = kernel
            .make_primitive(&Primitive::Box {
                length: size,
                width: size,
                height: size,
                centered: false,
            })
            .unwrap();
        kernel.translate(&cube, min).unwrap()
    }

    fn bounds(kernel: &EnvelopeKernel, solid: &Solid) -> Aabb {
        kernel.bounding_box(solid).unwrap().unwrap()
    }

    #[test]
    fn test_every_operation_type_is_registered() {
        let registry = OperationRegistry::new();
        assert_eq!(registry.supported_types(), OperationType::ALL.to_vec());
    }

    #[test]
    fn test_cut_removes_target() {
        let kernel = EnvelopeKernel::new();
        let base = cube_at(&kernel, DVec3::ZERO, 10.0);
        let tool = cube_at(&kernel, DVec3::splat(5.0), 10.0);
        let components = HashMap::from([("tool".to_string(), tool)]);
        let targets = [tool];
        let input = OperationInput::new(&kernel, &targets, &components);

        let op = Operation::new(OperationType::Cut, ["tool"]);
        let out = BooleanOperation.apply(&input, base, &op).unwrap();
        assert_relative_eq!(kernel.volume(&out).unwrap(), 1000.0 - 125.0);
    }

    #[test]
    fn test_boolean_tool_must_resolve() {
        let kernel = EnvelopeKernel::new();
        let base = cube_at(&kernel, DVec3::ZERO, 10.0);
        let components = HashMap::new();
        let input = OperationInput::new(&kernel, &[], &components);

        let op = Operation::new(OperationType::Union, Vec::<String>::new()).with_parameters(
            OperationParameters::Boolean(crate::model::BooleanParameters {
                tool: "ghost".into(),
            }),
        );
        let err = BooleanOperation.apply(&input, base, &op).unwrap_err();
        assert!(matches!(err, CompositionError::UnresolvedTarget(id) if id == "ghost"));
    }

    #[test]
    fn test_mirror_extends_bounds() {
        let kernel = EnvelopeKernel::new();
        let part = cube_at(&kernel, DVec3::new(5.0, 0.0, 0.0), 10.0);
        let components = HashMap::new();
        let targets = [part];
        let input = OperationInput::new(&kernel, &targets, &components);

        let op = Operation::new(OperationType::Mirror, ["part"])
            .with_parameters(OperationParameters::Mirror(MirrorParameters::default()));
        let out = MirrorOperation.apply(&input, part, &op).unwrap();
        let b = bounds(&kernel, &out);
        assert_eq!(b.min.x, -15.0);
        assert_eq!(b.max.x, 15.0);
    }

    #[test]
    fn test_array_copies() {
        let kernel = EnvelopeKernel::new();
        let part = cube_at(&kernel, DVec3::ZERO, 2.0);
        let components = HashMap::new();
        let targets = [part];
        let input = OperationInput::new(&kernel, &targets, &components);

        let op = Operation::new(OperationType::Array, ["part"]).with_parameters(
            OperationParameters::Array(ArrayParameters {
                count: 3,
                spacing: DVec3::new(5.0, 0.0, 0.0),
            }),
        );
        let out = ArrayOperation.apply(&input, part, &op).unwrap();
        assert_eq!(bounds(&kernel, &out).max.x, 12.0);
        assert_relative_eq!(kernel.volume(&out).unwrap(), 24.0);
    }

    #[test]
    fn test_rectangular_pattern_offsets() {
        let offsets = PatternOperation::grid_offsets(PatternType::Rectangular, 2, 3.0);
        assert_eq!(
            offsets,
            vec![
                DVec3::new(0.0, 3.0, 0.0),
                DVec3::new(3.0, 0.0, 0.0),
                DVec3::new(3.0, 3.0, 0.0),
            ]
        );
        assert_eq!(
            PatternOperation::grid_offsets(PatternType::Linear, 3, 2.0),
            vec![DVec3::new(2.0, 0.0, 0.0), DVec3::new(4.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn test_circular_pattern() {
        let kernel = EnvelopeKernel::new();
        let part = cube_at(&kernel, DVec3::new(10.0, -1.0, 0.0), 2.0);
        let components = HashMap::new();
        let targets = [part];
        let input = OperationInput::new(&kernel, &targets, &components);

        let op = Operation::new(OperationType::Pattern, ["part"]).with_parameters(
            OperationParameters::Pattern(PatternParameters {
                pattern_type: PatternType::Circular,
                count: 4,
                spacing: None,
                angle: 0.0,
                center: None,
            }),
        );
        let out = PatternOperation.apply(&input, part, &op).unwrap();
        let b = bounds(&kernel, &out);
        assert_relative_eq!(b.min.x, -12.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.y, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_modifier_needs_parameters() {
        let kernel = EnvelopeKernel::new();
        let base = cube_at(&kernel, DVec3::ZERO, 10.0);
        let components = HashMap::new();
        let input = OperationInput::new(&kernel, &[], &components);

        let op = Operation::new(OperationType::Fillet, Vec::<String>::new());
        let err = ModifierOperation.apply(&input, base, &op).unwrap_err();
        assert!(matches!(err, CompositionError::Validation(_)));
    }
}
