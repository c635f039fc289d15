//! Yield model inference: tree ensembles in pure Rust, ONNX Runtime for converted models.

mod error;
mod model;
pub mod tree;

#[cfg(feature = "onnx")]
mod onnx;

pub use error::ModelError;
pub use model::{ModelInfo, Regressor, load_model};
pub use tree::TreeEnsemble;

#[cfg(feature = "onnx")]
pub use onnx::OnnxRegressor;
