//! The fixed-order feature row handed to the yield model.

use arrow::datatypes::{DataType, Field, Schema};
use serde::Serialize;

pub const FEATURE_COUNT: usize = 9;

/// Column names in the order the model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Region",
    "Soil_Type",
    "Crop",
    "Rainfall_mm",
    "Temperature_Celsius",
    "Fertilizer_Used",
    "Irrigation_Used",
    "Weather_Condition",
    "Days_to_Harvest",
];

/// Columns holding categorical codes rather than measurements.
const CATEGORICAL: &[&str] = &[
    "Region",
    "Soil_Type",
    "Crop",
    "Fertilizer_Used",
    "Irrigation_Used",
    "Weather_Condition",
];

/// One encoded prediction input, values in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRow([f64; FEATURE_COUNT]);

impl FeatureRow {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Values narrowed to `f32`, the input precision of tree and ONNX models.
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.0.map(|v| v as f32)
    }

    /// Look up a value by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.0[i])
    }

    /// `(column name, value)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// Arrow schema for a feature row: codes as `Int32`, measurements as
/// `Float64`, harvest days as `Int64`.
pub fn feature_row_schema() -> Schema {
    let fields: Vec<Field> = FEATURE_NAMES
        .iter()
        .map(|&name| {
            let dt = match name {
                "Days_to_Harvest" => DataType::Int64,
                n if CATEGORICAL.contains(&n) => DataType::Int32,
                _ => DataType::Float64,
            };
            Field::new(name, dt, false)
        })
        .collect();
    Schema::new(fields)
}
