//! Geometry engine trait and backends

mod envelope;
mod scope;
mod traits;

pub use envelope::EnvelopeKernel;
pub use scope::ScopedKernel;
pub use traits::*;
