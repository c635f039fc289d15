//! Model loading and the prediction seam shared by all model formats.

use std::fmt;
use std::path::{Path, PathBuf};

use cropyield_core::FeatureRow;
use serde::Serialize;
use tracing::info;

use crate::error::ModelError;
use crate::tree::TreeEnsemble;

#[cfg(feature = "onnx")]
pub(crate) const SUPPORTED_FORMATS: &str = ".json, .onnx";
#[cfg(not(feature = "onnx"))]
pub(crate) const SUPPORTED_FORMATS: &str = ".json";

/// A pre-trained regression model that maps one feature row to a yield estimate.
pub trait Regressor: Send {
    /// Predict the yield (tons/ha) for a single encoded row.
    fn predict(&mut self, row: &FeatureRow) -> Result<f64, ModelError>;

    /// Metadata about the loaded artifact.
    fn describe(&self) -> ModelInfo;
}

/// Metadata reported by a loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Artifact format, e.g. `tree-ensemble` or `onnx`.
    pub format: &'static str,
    pub path: Option<PathBuf>,
    /// Format-specific summary (tree count, input name, ...).
    pub detail: String,
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Load a model artifact, choosing the backend from the file extension.
///
/// `.json` loads a [`TreeEnsemble`]; `.onnx` loads an ONNX Runtime session
/// when built with the `onnx` feature.
pub fn load_model(path: &Path) -> Result<Box<dyn Regressor>, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model: Box<dyn Regressor> = match extension.as_str() {
        "json" => Box::new(TreeEnsemble::load(path)?),
        #[cfg(feature = "onnx")]
        "onnx" => Box::new(crate::onnx::OnnxRegressor::load(path)?),
        _ => {
            return Err(ModelError::UnsupportedFormat {
                extension: extension.clone(),
                supported: SUPPORTED_FORMATS,
            });
        }
    };

    info!(model = %model.describe(), "loaded yield model");
    Ok(model)
}
