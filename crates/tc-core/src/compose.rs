//! Composition of a configuration into a single solid

use std::collections::HashMap;

use glam::DVec3;
use tc_cad::{BooleanType, CadKernel, Solid};

use crate::error::{CompositionError, ValidationError};
use crate::handlers::{BuildContext, ShapeHandlerRegistry};
use crate::model::{CadConfiguration, Parameters};
use crate::operations::{OperationInput, OperationRegistry};
use crate::transform::TransformApplier;

/// Builds every component, unions them and runs the operations
pub struct CompositionEngine<'a> {
    kernel: &'a dyn CadKernel,
    shapes: &'a ShapeHandlerRegistry,
    operations: &'a OperationRegistry,
    transforms: TransformApplier,
}

impl<'a> CompositionEngine<'a> {
    pub fn new(
        kernel: &'a dyn CadKernel,
        shapes: &'a ShapeHandlerRegistry,
        operations: &'a OperationRegistry,
        transforms: TransformApplier,
    ) -> Self {
        Self {
            kernel,
            shapes,
            operations,
            transforms,
        }
    }

    /// Compose a configuration.
    ///
    /// Shapes are built in order, then gears. Components without an id are
    /// stored as `shape_<i>` / `gear_<i>`. Operation targets are resolved
    /// before the operation itself is validated. An empty configuration
    /// yields the kernel's empty workplane.
    pub fn compose(&self, config: &CadConfiguration) -> Result<Solid, CompositionError> {
        let ctx = BuildContext::new(self.kernel, self.transforms);
        let mut components: HashMap<String, Solid> = HashMap::new();
        let mut accumulated: Option<Solid> = None;

        let shapes = config.shapes.iter().enumerate().map(|(i, s)| {
            let id = s.id.clone().unwrap_or_else(|| format!("shape_{}", i));
            (id, s.parameters(), s.position, s.rotation)
        });
        let gears = config.gears().iter().enumerate().map(|(i, g)| {
            let id = g.id.clone().unwrap_or_else(|| format!("gear_{}", i));
            (id, g.parameters(), g.position, g.rotation)
        });

        for (id, parameters, position, rotation) in shapes.chain(gears) {
            let solid = self.build(&ctx, &id, parameters, position, rotation)?;

            accumulated = Some(match accumulated {
                None => solid,
                Some(acc) => self.kernel.boolean(&acc, &solid, BooleanType::Union)?,
            });

            if components.insert(id.clone(), solid).is_some() {
                tracing::warn!(%id, "Duplicate component id; operations see the later one");
            }
        }

        if config.sketch.as_ref().is_some_and(|s| !s.is_empty()) {
            tracing::debug!("Sketch present; sketches are not executed");
        }

        for operation in config.operations() {
            let targets = operation
                .targets
                .iter()
                .map(|id| {
                    components
                        .get(id)
                        .copied()
                        .ok_or_else(|| CompositionError::UnresolvedTarget(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(tool) = operation.tool()
                && !components.contains_key(tool)
            {
                return Err(CompositionError::UnresolvedTarget(tool.to_string()));
            }
            operation.validate()?;
            let handler = self.operations.get(operation.kind)?;

            let acc = accumulated.ok_or_else(|| {
                ValidationError::new(
                    "operations",
                    format!("{} operation has no solid to act on", operation.kind),
                )
            })?;

            tracing::debug!(
                kind = %operation.kind,
                handler = handler.name(),
                targets = ?operation.targets,
                "Applying operation"
            );
            let input = OperationInput::new(self.kernel, &targets, &components);
            accumulated = Some(handler.apply(&input, acc, operation)?);
        }

        match accumulated {
            Some(solid) => Ok(solid),
            None => {
                tracing::debug!("Configuration has no components; returning empty workplane");
                Ok(self.kernel.workplane()?)
            }
        }
    }

    fn build(
        &self,
        ctx: &BuildContext<'_>,
        id: &str,
        parameters: &Parameters,
        position: DVec3,
        rotation: DVec3,
    ) -> Result<Solid, CompositionError> {
        let key = parameters.type_key();
        let handler = self.shapes.get(key)?;
        tracing::debug!(id, key, handler = handler.name(), "Building component");
        handler.create(ctx, parameters, position, rotation)
    }
}
