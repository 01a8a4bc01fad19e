//! Writing the final solid to disk

use std::path::{Path, PathBuf};

use tc_cad::{Assembly, CadKernel, ExportFormat, Solid};
use uuid::Uuid;

use crate::error::ExportError;

/// Part name the exported solid carries inside its assembly
pub const MAIN_SHAPE: &str = "main_shape";

/// Exports solids under unique file names in one directory
#[derive(Debug, Clone)]
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Write `solid` as `<uuid>.<ext>` and return the file path
    pub fn export(
        &self,
        kernel: &dyn CadKernel,
        solid: &Solid,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.export_dir).map_err(|source| ExportError::CreateDir {
            path: self.export_dir.clone(),
            source,
        })?;

        let path = self
            .export_dir
            .join(format!("{}.{}", Uuid::new_v4(), format.extension()));
        let assembly = Assembly::new().add(*solid, MAIN_SHAPE);

        kernel
            .export(&assembly, &path, format)
            .map_err(|source| ExportError::Engine {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), %format, "Exported model");
        Ok(path)
    }
}
