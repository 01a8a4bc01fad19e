//! Geometry Engine Abstraction
//!
//! This crate provides:
//! - The [`CadKernel`] trait every geometry engine implements
//! - Opaque [`Solid`] handles, face selectors and export formats
//! - A [`NullKernel`] that rejects every operation
//! - An [`EnvelopeKernel`] reference engine tracking bounds and volumes
//! - A [`ScopedKernel`] that releases a request's solids when dropped

pub mod kernel;

// Re-exports for convenience
pub use kernel::{
    Aabb, Assembly, AssemblyPart, BooleanType, CadError, CadKernel, CadResult, EnvelopeKernel,
    ExportFormat, Face, MirrorPlane, NullKernel, Primitive, ScopedKernel, Solid, default_kernel,
};
