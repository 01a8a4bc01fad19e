//! Text-to-CAD Core Library
//!
//! This crate provides:
//! - Parsing of labeled entity streams into raw fields
//! - Synthesis of validated [`CadConfiguration`]s with unit normalization
//! - Shape and operation handler registries
//! - Composition of configurations into solids and export to files

pub mod compose;
pub mod context;
pub mod entity;
pub mod error;
pub mod export;
pub mod feature;
pub mod handlers;
pub mod model;
pub mod operations;
pub mod parser;
pub mod settings;
pub mod synthesis;
pub mod transform;
pub mod units;

// Re-exports for convenience
pub use compose::CompositionEngine;
pub use context::{CadContext, GenerationResponse};
pub use entity::{Entity, EntityExtractor, ExtractionError, Label};
pub use error::{
    CompositionError, ExportError, PipelineError, SynthesisError, ValidationError,
};
pub use export::{Exporter, MAIN_SHAPE};
pub use feature::FeatureApplier;
pub use handlers::{BuildContext, ShapeHandler, ShapeHandlerRegistry};
pub use model::{CadConfiguration, Feature, Gear, Operation, OperationType, Parameters, Shape};
pub use operations::{OperationHandler, OperationInput, OperationRegistry};
pub use parser::{EntityStreamParser, RawFieldAccumulator};
pub use settings::{Settings, SettingsError};
pub use synthesis::{ConfigurationSynthesizer, Synthesis};
pub use transform::{PivotMode, TransformApplier};
pub use units::Units;
