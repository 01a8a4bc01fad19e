//! Request-scoped kernel
//!
//! [`ScopedKernel`] forwards every call to an inner kernel and remembers the
//! solids it hands out. Dropping the scope releases all of them, so a
//! long-lived kernel does not accumulate intermediate geometry.

use std::path::Path;

use glam::{DVec2, DVec3};
use parking_lot::Mutex;

use super::{
    Aabb, Assembly, BooleanType, CadKernel, CadResult, ExportFormat, Face, MirrorPlane, Primitive,
    Solid,
};

pub struct ScopedKernel<'a> {
    inner: &'a dyn CadKernel,
    created: Mutex<Vec<Solid>>,
}

impl<'a> ScopedKernel<'a> {
    pub fn new(inner: &'a dyn CadKernel) -> Self {
        Self {
            inner,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Number of solids created through this scope and not yet released
    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    fn track(&self, result: CadResult<Solid>) -> CadResult<Solid> {
        if let Ok(solid) = &result {
            self.created.lock().push(*solid);
        }
        result
    }
}

impl Drop for ScopedKernel<'_> {
    fn drop(&mut self) {
        let created = std::mem::take(self.created.get_mut());
        if !created.is_empty() {
            tracing::debug!(count = created.len(), "Releasing scoped solids");
        }
        for solid in &created {
            self.inner.release(solid);
        }
    }
}

impl CadKernel for ScopedKernel<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn workplane(&self) -> CadResult<Solid> {
        self.track(self.inner.workplane())
    }

    fn make_primitive(&self, primitive: &Primitive) -> CadResult<Solid> {
        self.track(self.inner.make_primitive(primitive))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        self.track(self.inner.boolean(a, b, op))
    }

    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        self.track(self.inner.translate(solid, offset))
    }

    fn rotate(&self, solid: &Solid, pivot: DVec3, axis: DVec3, degrees: f64) -> CadResult<Solid> {
        self.track(self.inner.rotate(solid, pivot, axis, degrees))
    }

    fn cut_hole(
        &self,
        solid: &Solid,
        face: Face,
        position: DVec2,
        diameter: f64,
        depth: Option<f64>,
    ) -> CadResult<Solid> {
        self.track(self.inner.cut_hole(solid, face, position, diameter, depth))
    }

    fn fillet(&self, solid: &Solid, radius: f64) -> CadResult<Solid> {
        self.track(self.inner.fillet(solid, radius))
    }

    fn chamfer(&self, solid: &Solid, length: f64) -> CadResult<Solid> {
        self.track(self.inner.chamfer(solid, length))
    }

    fn shell(&self, solid: &Solid, thickness: f64, faces_to_remove: &[Face]) -> CadResult<Solid> {
        self.track(self.inner.shell(solid, thickness, faces_to_remove))
    }

    fn mirror(&self, solid: &Solid, plane: MirrorPlane) -> CadResult<Solid> {
        self.track(self.inner.mirror(solid, plane))
    }

    fn bounding_box(&self, solid: &Solid) -> CadResult<Option<Aabb>> {
        self.inner.bounding_box(solid)
    }

    fn volume(&self, solid: &Solid) -> CadResult<f64> {
        self.inner.volume(solid)
    }

    fn export(&self, assembly: &Assembly, path: &Path, format: ExportFormat) -> CadResult<()> {
        self.inner.export(assembly, path, format)
    }

    fn release(&self, solid: &Solid) {
        self.created.lock().retain(|s| s != solid);
        self.inner.release(solid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{CadError, EnvelopeKernel};

    fn unit_box() -> Primitive {
        Primitive::Box {
            length: 1.0,
            width: 1.0,
            height: 1.0,
            centered: true,
        }
    }

    #[test]
    fn test_drop_releases_created_solids() {
        let kernel = EnvelopeKernel::new();
        let outside = kernel.make_primitive(&unit_box()).unwrap();

        {
            let scope = ScopedKernel::new(&kernel);
            let a = scope.make_primitive(&unit_box()).unwrap();
            let b = scope.translate(&a, DVec3::X).unwrap();
            scope.boolean(&a, &b, BooleanType::Union).unwrap();
            scope.boolean(&outside, &b, BooleanType::Union).unwrap();
            assert_eq!(scope.created_count(), 4);
            assert_eq!(kernel.solid_count(), 5);
        }

        assert_eq!(kernel.solid_count(), 1);
        assert!(kernel.volume(&outside).is_ok());
    }

    #[test]
    fn test_failed_calls_are_not_tracked() {
        let kernel = EnvelopeKernel::new();
        let scope = ScopedKernel::new(&kernel);
        let solid = scope.make_primitive(&unit_box()).unwrap();
        assert!(matches!(
            scope.fillet(&solid, 5.0),
            Err(CadError::OperationFailed(_))
        ));
        assert_eq!(scope.created_count(), 1);

        scope.release(&solid);
        assert_eq!(scope.created_count(), 0);
        assert_eq!(kernel.solid_count(), 0);
    }
}
