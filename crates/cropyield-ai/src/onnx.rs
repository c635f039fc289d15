//! ONNX Runtime regressor for yield models converted from scikit-learn.
//!
//! Expects a single float tensor input of shape `[batch, 9]` (the layout
//! `skl2onnx` emits for a `FloatTensorType([None, 9])` initial type) and
//! reads the first output as the prediction.

use std::path::{Path, PathBuf};

use cropyield_core::{FEATURE_COUNT, FeatureRow};
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use crate::error::ModelError;
use crate::model::{ModelInfo, Regressor};

/// Yield regressor backed by an ONNX Runtime session.
pub struct OnnxRegressor {
    session: Session,
    input_name: String,
    path: PathBuf,
}

impl OnnxRegressor {
    /// Load a converted model from a `.onnx` file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(onnx_err)?
            .commit_from_file(path)
            .map_err(onnx_err)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| ModelError::Invalid("onnx model declares no inputs".into()))?;
        let input_name = input.name().to_string();

        // Dynamic dimensions are reported as -1; only a fixed width can be checked.
        if let Some(width) = infer_width(input.dtype())
            && width != FEATURE_COUNT
        {
            return Err(ModelError::Invalid(format!(
                "onnx input '{input_name}' takes {width} features, expected {FEATURE_COUNT}"
            )));
        }

        info!(input = %input_name, model = %path.display(), "loaded onnx regressor");
        Ok(Self {
            session,
            input_name,
            path: path.to_path_buf(),
        })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&mut self, row: &FeatureRow) -> Result<f64, ModelError> {
        let shape = [1i64, FEATURE_COUNT as i64];
        let input = Tensor::from_array((shape, row.to_f32().to_vec().into_boxed_slice()))
            .map_err(onnx_err)?;

        let name = self.input_name.clone();
        let outputs = self
            .session
            .run(ort::inputs![name => input])
            .map_err(onnx_err)?;

        let (_, data) = outputs[0].try_extract_tensor::<f32>().map_err(onnx_err)?;
        let y = data
            .first()
            .copied()
            .map(f64::from)
            .ok_or_else(|| ModelError::Inference("onnx model returned an empty tensor".into()))?;

        debug!(prediction = y, "onnx prediction");
        if !y.is_finite() {
            return Err(ModelError::Inference(format!("non-finite prediction {y}")));
        }
        Ok(y)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            format: "onnx",
            path: Some(self.path.clone()),
            detail: format!("input '{}'", self.input_name),
        }
    }
}

fn onnx_err(e: impl std::fmt::Display) -> ModelError {
    ModelError::Onnx(e.to_string())
}

/// Last dimension of a tensor input, when the model fixes it.
fn infer_width(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
