//! Shape handlers and their registry
//!
//! A handler turns validated parameters into a placed solid. The registry
//! maps every parameter type key to the handler that builds it.

mod gears;
mod shapes;

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;
use tc_cad::{CadKernel, Primitive, Solid};

use crate::error::{CompositionError, ValidationError};
use crate::feature::FeatureApplier;
use crate::model::{Feature, Parameters};
use crate::transform::TransformApplier;

pub use gears::{BevelGearHandler, SpurGearHandler};
pub use shapes::{
    BoxHandler, ConeHandler, CylinderHandler, SphereHandler, TorusHandler, WedgeHandler,
};

/// Engine and appliers a handler builds with
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub kernel: &'a dyn CadKernel,
    pub transforms: TransformApplier,
    pub features: FeatureApplier,
}

impl<'a> BuildContext<'a> {
    pub fn new(kernel: &'a dyn CadKernel, transforms: TransformApplier) -> Self {
        Self {
            kernel,
            transforms,
            features: FeatureApplier::new(),
        }
    }

    /// Build a primitive, cut its features, then place it
    pub fn build(
        &self,
        primitive: &Primitive,
        features: &[Feature],
        position: DVec3,
        rotation: DVec3,
    ) -> Result<Solid, CompositionError> {
        let solid = self.kernel.make_primitive(primitive)?;
        let solid = self.features.apply(self.kernel, solid, features)?;
        Ok(self.transforms.apply(self.kernel, solid, position, rotation)?)
    }
}

/// Error for parameters handed to the wrong handler
pub(crate) fn mismatch(handler: &str, parameters: &Parameters) -> ValidationError {
    ValidationError::new(
        "type",
        format!(
            "{} handler cannot build '{}' parameters",
            handler,
            parameters.type_key()
        ),
    )
}

/// Builds solids for one or more parameter types
pub trait ShapeHandler: Send + Sync {
    /// Handler name, for logs
    fn name(&self) -> &'static str;

    /// Parameter type keys this handler is registered under
    fn supported_types(&self) -> &'static [&'static str];

    /// Check that the parameters belong to this handler and are in bounds
    fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError>;

    /// Build the primitive, apply its features, then translate and rotate it
    fn create(
        &self,
        ctx: &BuildContext<'_>,
        parameters: &Parameters,
        position: DVec3,
        rotation: DVec3,
    ) -> Result<Solid, CompositionError> {
        self.validate(parameters)?;
        ctx.build(
            &parameters.to_primitive(),
            parameters.features(),
            position,
            rotation,
        )
    }
}

/// Handlers registered by default, in registration order
pub fn default_handlers() -> Vec<Box<dyn ShapeHandler>> {
    vec![
        Box::new(BoxHandler),
        Box::new(CylinderHandler),
        Box::new(SphereHandler),
        Box::new(ConeHandler),
        Box::new(TorusHandler),
        Box::new(WedgeHandler),
        Box::new(SpurGearHandler),
        Box::new(BevelGearHandler),
    ]
}

/// Dispatch table from type key to handler
pub struct ShapeHandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn ShapeHandler>>,
}

impl ShapeHandlerRegistry {
    /// Registry with all built-in handlers
    pub fn new() -> Self {
        Self::from_handlers(default_handlers())
    }

    /// Register handlers in order; a later handler claiming a key already
    /// taken replaces the earlier one for that key.
    pub fn from_handlers(handlers: impl IntoIterator<Item = Box<dyn ShapeHandler>>) -> Self {
        let mut map: HashMap<&'static str, Arc<dyn ShapeHandler>> = HashMap::new();
        for handler in handlers {
            let handler: Arc<dyn ShapeHandler> = Arc::from(handler);
            for &key in handler.supported_types() {
                match map.insert(key, Arc::clone(&handler)) {
                    Some(previous) => tracing::debug!(
                        key,
                        replaced = previous.name(),
                        by = handler.name(),
                        "Shape handler replaced"
                    ),
                    None => tracing::debug!(key, handler = handler.name(), "Registered shape handler"),
                }
            }
        }
        Self { handlers: map }
    }

    /// Handler for a type key
    pub fn get(&self, key: &str) -> Result<&dyn ShapeHandler, CompositionError> {
        self.handlers
            .get(key)
            .map(|h| h.as_ref())
            .ok_or_else(|| CompositionError::NoHandler(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered type keys, sorted
    pub fn supported_types(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ShapeHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoxParameters, CylinderParameters};
    use tc_cad::EnvelopeKernel;

    struct NamedHandler(&'static str);

    impl ShapeHandler for NamedHandler {
        fn name(&self) -> &'static str {
            self.0
        }

        fn supported_types(&self) -> &'static [&'static str] {
            &["box"]
        }

        fn validate(&self, _parameters: &Parameters) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    #[test]
    fn test_every_parameter_type_has_a_handler() {
        let registry = ShapeHandlerRegistry::new();
        for key in [
            "box",
            "cylinder",
            "sphere",
            "cone",
            "torus",
            "wedge",
            "spur_gear",
            "bevel_gear",
        ] {
            assert!(registry.get(key).unwrap().supported_types().contains(&key));
        }
        assert!(registry.contains("spur"));
        assert!(registry.contains("bevel"));
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn test_unknown_key() {
        let registry = ShapeHandlerRegistry::new();
        let err = registry.get("pyramid").err().unwrap();
        assert!(matches!(err, CompositionError::NoHandler(k) if k == "pyramid"));
    }

    #[test]
    fn test_later_registration_shadows() {
        let registry = ShapeHandlerRegistry::from_handlers(vec![
            Box::new(NamedHandler("first")) as Box<dyn ShapeHandler>,
            Box::new(NamedHandler("second")),
        ]);
        assert_eq!(registry.get("box").unwrap().name(), "second");
        assert_eq!(registry.supported_types(), vec!["box"]);
    }

    #[test]
    fn test_handler_rejects_foreign_parameters() {
        let registry = ShapeHandlerRegistry::new();
        let cylinder = Parameters::Cylinder(CylinderParameters::new(1.0, 2.0).unwrap());
        let err = registry.get("box").unwrap().validate(&cylinder).unwrap_err();
        assert_eq!(err.field, "type");
    }

    #[test]
    fn test_create_places_solid() {
        let kernel = EnvelopeKernel::new();
        let ctx = BuildContext::new(&kernel, TransformApplier::default());
        let params = Parameters::Box(BoxParameters::new(10.0, 20.0, 30.0).unwrap());

        let solid = ShapeHandlerRegistry::new()
            .get("box")
            .unwrap()
            .create(&ctx, &params, DVec3::new(1.0, 1.0, 1.0), DVec3::ZERO)
            .unwrap();
        let bounds = kernel.bounding_box(&solid).unwrap().unwrap();
        assert_eq!(bounds.min, DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(bounds.max, DVec3::new(11.0, 21.0, 31.0));
    }
}
