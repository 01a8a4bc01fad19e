//! Error types for each pipeline stage
//!
//! Errors raised while building a configuration from entities are
//! recoverable per item ([`SynthesisError`]). Errors raised while turning a
//! configuration into geometry ([`CompositionError`], [`ExportError`]) abort
//! the whole request.

use std::path::PathBuf;

use tc_cad::CadError;
use thiserror::Error;

/// A parameter outside its declared bounds
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while synthesizing a configuration from raw fields
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error("{shape} requires {expected} dimension(s), got {got}")]
    Arity {
        shape: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("Unknown shape type: {0}")]
    UnresolvedShape(String),

    #[error("Not a number: '{0}'")]
    InvalidNumber(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while turning a configuration into geometry
#[derive(Debug, Clone, Error)]
pub enum CompositionError {
    #[error("No handler for type {0}")]
    NoHandler(String),

    #[error("Operation target '{0}' does not exist")]
    UnresolvedTarget(String),

    #[error("Feature '{0}' is not implemented")]
    NotImplementedFeature(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Geometry engine error: {0}")]
    Kernel(#[from] CadError),
}

/// Errors raised while exporting the final solid
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model export to {path} failed: {source}")]
    Engine {
        path: PathBuf,
        #[source]
        source: CadError,
    },
}

/// Any fatal error of a configuration-to-file request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
