//! Text and JSON rendering for predictions, code tables, and model metadata.
//!
//! Cards follow one layout: a section header, then indented
//! `label  value` rows with labels padded to a fixed column.

use cropyield_ai::ModelInfo;
use cropyield_core::encoding::{self, Categorical};
use cropyield_core::{FeatureRow, PredictionRequest, feature_row_schema};
use serde::Serialize;

const LABEL_WIDTH: usize = 26;

pub const TITLE: &str = "Crop Yield Prediction Portal";
pub const SUBTITLE: &str = "Predict crop yield based on environmental and agricultural factors.";

// ── Prediction ──

/// The result line shown after every prediction.
pub fn format_yield(tons_per_ha: f64) -> String {
    format!("The predicted crop yield is: {tons_per_ha:.2} tons/ha")
}

/// Vertical card of the request: chosen label and encoded code per field.
pub fn render_request(req: &PredictionRequest) -> String {
    let mut out = String::from("Inputs\n");
    out.push_str(&coded_row("Region", req.region));
    out.push_str(&coded_row("Soil Type", req.soil_type));
    out.push_str(&coded_row("Crop Type", req.crop));
    out.push_str(&coded_row("Fertilizer Used", req.fertilizer_used));
    out.push_str(&coded_row("Irrigation Used", req.irrigation_used));
    out.push_str(&coded_row("Weather Condition", req.weather_condition));
    out.push_str(&row("Rainfall (mm)", req.rainfall_mm));
    out.push_str(&row("Temperature (°C)", req.temperature_celsius));
    out.push_str(&row("Days to Harvest", req.days_to_harvest));
    out
}

pub fn print_prediction(req: &PredictionRequest, tons_per_ha: f64) {
    println!("{}", render_request(req));
    println!("{}", format_yield(tons_per_ha));
}

#[derive(Serialize)]
struct Feature {
    name: &'static str,
    value: f64,
}

#[derive(Serialize)]
struct PredictionOutput<'a> {
    request: &'a PredictionRequest,
    features: Vec<Feature>,
    predicted_yield: f64,
    unit: &'static str,
}

/// JSON document with the request, the encoded row, and the prediction.
pub fn prediction_json(
    req: &PredictionRequest,
    features: &FeatureRow,
    tons_per_ha: f64,
) -> serde_json::Result<String> {
    let output = PredictionOutput {
        request: req,
        features: features
            .iter()
            .map(|(name, value)| Feature { name, value })
            .collect(),
        predicted_yield: tons_per_ha,
        unit: "tons/ha",
    };
    serde_json::to_string_pretty(&output)
}

// ── Code tables ──

pub fn render_options() -> String {
    let mut out = String::new();
    for field in encoding::options() {
        out.push_str(&format!("{} [{}]\n", field.prompt, field.field));
        for (label, code) in &field.choices {
            out.push_str(&row(label, code));
        }
        out.push('\n');
    }
    out
}

pub fn print_options() {
    print!("{}", render_options());
}

// ── Model metadata ──

pub fn render_model_info(info: &ModelInfo) -> String {
    let mut out = String::from("Model\n");
    out.push_str(&row("format", info.format));
    if let Some(path) = &info.path {
        out.push_str(&row("path", path.display()));
    }
    if !info.detail.is_empty() {
        out.push_str(&row("detail", &info.detail));
    }

    out.push_str("\nInput schema\n");
    for (i, field) in feature_row_schema().fields().iter().enumerate() {
        let name = format!("{i:<3}{}", field.name());
        out.push_str(&row(&name, field.data_type()));
    }
    out
}

pub fn print_model_info(info: &ModelInfo) {
    print!("{}", render_model_info(info));
}

// ── Helpers ──

fn row(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {label:<LABEL_WIDTH$} {value}\n")
}

fn coded_row<T: Categorical>(label: &str, value: T) -> String {
    row(label, format!("{} ({})", value.label(), value.code()))
}
