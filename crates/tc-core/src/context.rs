//! Pipeline context
//!
//! A [`CadContext`] owns the geometry engine, both registries, the exporter
//! and the settings. It is built once at start-up and passed by reference to
//! every request.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tc_cad::{CadKernel, ExportFormat, ScopedKernel, Solid, default_kernel};

use crate::compose::CompositionEngine;
use crate::entity::{Entity, EntityExtractor};
use crate::error::{CompositionError, ExportError, PipelineError};
use crate::export::Exporter;
use crate::handlers::ShapeHandlerRegistry;
use crate::model::CadConfiguration;
use crate::operations::OperationRegistry;
use crate::parser::EntityStreamParser;
use crate::settings::Settings;
use crate::synthesis::{ConfigurationSynthesizer, Synthesis};
use crate::transform::TransformApplier;

/// Outcome of one generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl GenerationResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.model_path.is_some()
    }
}

pub struct CadContext {
    kernel: Arc<dyn CadKernel>,
    shapes: ShapeHandlerRegistry,
    operations: OperationRegistry,
    parser: EntityStreamParser,
    synthesizer: ConfigurationSynthesizer,
    exporter: Exporter,
    settings: Settings,
}

impl CadContext {
    /// Create a context backed by the default geometry engine
    pub fn new(settings: Settings) -> Self {
        Self::with_kernel(Arc::from(default_kernel()), settings)
    }

    pub fn with_kernel(kernel: Arc<dyn CadKernel>, settings: Settings) -> Self {
        let shapes = ShapeHandlerRegistry::new();
        let operations = OperationRegistry::new();
        tracing::info!(
            kernel = kernel.name(),
            shape_types = shapes.len(),
            export_dir = %settings.export_dir.display(),
            "CAD context ready"
        );

        Self {
            kernel,
            shapes,
            operations,
            parser: EntityStreamParser::new(),
            synthesizer: ConfigurationSynthesizer::new(),
            exporter: Exporter::new(settings.export_dir.clone()),
            settings,
        }
    }

    pub fn kernel(&self) -> &dyn CadKernel {
        self.kernel.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shape_handlers(&self) -> &ShapeHandlerRegistry {
        &self.shapes
    }

    pub fn operation_handlers(&self) -> &OperationRegistry {
        &self.operations
    }

    /// Parse entities and synthesize a configuration
    pub fn configure(&self, entities: &[Entity]) -> Synthesis {
        let raw = self.parser.parse(entities);
        self.synthesizer.synthesize(raw)
    }

    /// Compose a configuration into a single solid.
    ///
    /// The solid and its intermediates stay in the kernel; callers that do
    /// not need the solid afterwards should use [`CadContext::build`].
    pub fn process_configuration(
        &self,
        config: &CadConfiguration,
    ) -> Result<Solid, CompositionError> {
        self.compose_with(self.kernel(), config)
    }

    fn compose_with(
        &self,
        kernel: &dyn CadKernel,
        config: &CadConfiguration,
    ) -> Result<Solid, CompositionError> {
        CompositionEngine::new(
            kernel,
            &self.shapes,
            &self.operations,
            TransformApplier::new(self.settings.pivot_mode),
        )
        .compose(config)
    }

    pub fn export_model(
        &self,
        solid: &Solid,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        self.exporter.export(self.kernel(), solid, format)
    }

    /// Compose and export a configuration.
    ///
    /// The format is taken from `format`, then the configuration's export
    /// settings, then [`Settings::export_format`]. Every solid created for
    /// the request is released before returning.
    pub fn build(
        &self,
        config: &CadConfiguration,
        format: Option<ExportFormat>,
    ) -> Result<PathBuf, PipelineError> {
        let format = format
            .or_else(|| config.export.as_ref().and_then(|e| e.format))
            .unwrap_or(self.settings.export_format);

        let scope = ScopedKernel::new(self.kernel());
        let solid = self.compose_with(&scope, config)?;
        Ok(self.exporter.export(&scope, &solid, format)?)
    }

    /// Run the whole pipeline on an entity stream
    pub fn generate(
        &self,
        entities: &[Entity],
        format: Option<ExportFormat>,
    ) -> GenerationResponse {
        let Synthesis {
            configuration,
            warnings,
        } = self.configure(entities);
        tracing::info!(
            components = configuration.component_count(),
            warnings = warnings.len(),
            "Configuration synthesized"
        );

        match self.build(&configuration, format) {
            Ok(path) => GenerationResponse {
                model_path: Some(path),
                error: None,
                warnings,
            },
            Err(err) => {
                tracing::error!(%err, "Model generation failed");
                GenerationResponse {
                    model_path: None,
                    error: Some(err.to_string()),
                    warnings,
                }
            }
        }
    }

    /// Extract entities from text, then run [`CadContext::generate`]
    pub fn generate_from_text(
        &self,
        extractor: &dyn EntityExtractor,
        text: &str,
        format: Option<ExportFormat>,
    ) -> GenerationResponse {
        match extractor.extract_entities(text) {
            Ok(entities) => self.generate(&entities, format),
            Err(err) => {
                tracing::error!(%err, "Entity extraction failed");
                GenerationResponse {
                    error: Some(err.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}

impl Default for CadContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
