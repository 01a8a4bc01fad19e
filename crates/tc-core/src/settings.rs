//! Runtime settings
//!
//! Settings are loaded from a RON file and can be overridden through the
//! environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tc_cad::ExportFormat;
use thiserror::Error;

use crate::transform::PivotMode;

/// Environment variable overriding [`Settings::export_dir`]
pub const EXPORT_DIR_ENV: &str = "TC_EXPORT_DIR";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory exported models are written to
    pub export_dir: PathBuf,
    /// Format used when neither the request nor the configuration names one
    pub export_format: ExportFormat,
    /// Rotation pivots used when placing components
    pub pivot_mode: PivotMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            export_format: ExportFormat::Stl,
            pivot_mode: PivotMode::Origin,
        }
    }
}

impl Settings {
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron_str(&text)?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(EXPORT_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            tracing::debug!(%dir, "Export directory overridden by environment");
            self.export_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn to_ron_pretty(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.export_dir, PathBuf::from("exports"));
        assert_eq!(settings.pivot_mode, PivotMode::Origin);
    }

    #[test]
    fn test_partial_ron() {
        let settings = Settings::from_ron_str("(pivot_mode: legacy)").unwrap();
        assert_eq!(settings.pivot_mode, PivotMode::Legacy);
        assert_eq!(settings.export_format, ExportFormat::Stl);
    }

    #[test]
    fn test_ron_roundtrip() {
        let settings = Settings {
            export_dir: PathBuf::from("/tmp/models"),
            export_format: ExportFormat::Json,
            pivot_mode: PivotMode::Legacy,
        };
        let text = settings.to_ron_pretty().unwrap();
        assert_eq!(Settings::from_ron_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            Settings::from_ron_str("(pivot_mode: sideways)"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        std::fs::write(&path, "(export_dir: \"from-file\")").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.export_dir, PathBuf::from("from-file"));

        let settings = settings.with_overrides(|key| {
            (key == EXPORT_DIR_ENV).then(|| "from-env".to_string())
        });
        assert_eq!(settings.export_dir, PathBuf::from("from-env"));

        let missing = Settings::load(&dir.path().join("absent.ron"));
        assert!(matches!(missing, Err(SettingsError::Io { .. })));
    }
}
