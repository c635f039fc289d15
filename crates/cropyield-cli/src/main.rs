mod display;
mod form;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cropyield_ai::{Regressor, load_model};
use cropyield_core::request::{DEFAULT_DAYS_TO_HARVEST, DEFAULT_RAINFALL_MM, DEFAULT_TEMPERATURE_C};
use cropyield_core::{Crop, PredictionRequest, Region, SoilType, WeatherCondition, YesNo};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cropyield", version, about = display::SUBTITLE)]
struct Cli {
    /// Trained yield model (.json tree ensemble, or .onnx with the `onnx` feature)
    #[arg(
        long,
        global = true,
        env = "CROPYIELD_MODEL",
        default_value = "models/yield_model.json"
    )]
    model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the yield for inputs given as flags
    Predict(PredictArgs),
    /// Fill in the prediction form interactively
    Form,
    /// List every dropdown's choices and their codes
    Options,
    /// Show metadata for the loaded model
    Inspect,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long, default_value_t = Region::East)]
    region: Region,

    #[arg(long, default_value_t = SoilType::Chalky)]
    soil_type: SoilType,

    #[arg(long, default_value_t = Crop::Barley)]
    crop: Crop,

    #[arg(long, default_value_t = DEFAULT_RAINFALL_MM, allow_negative_numbers = true)]
    rainfall_mm: f64,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE_C, allow_negative_numbers = true)]
    temperature_celsius: f64,

    #[arg(long, default_value_t = YesNo::No)]
    fertilizer_used: YesNo,

    #[arg(long, default_value_t = YesNo::No)]
    irrigation_used: YesNo,

    #[arg(long, default_value_t = WeatherCondition::Cloudy)]
    weather_condition: WeatherCondition,

    #[arg(long, default_value_t = DEFAULT_DAYS_TO_HARVEST)]
    days_to_harvest: u32,

    /// Print the request, encoded features, and prediction as JSON
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn request(&self) -> PredictionRequest {
        PredictionRequest {
            region: self.region,
            soil_type: self.soil_type,
            crop: self.crop,
            rainfall_mm: self.rainfall_mm,
            temperature_celsius: self.temperature_celsius,
            fertilizer_used: self.fertilizer_used,
            irrigation_used: self.irrigation_used,
            weather_condition: self.weather_condition,
            days_to_harvest: self.days_to_harvest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("cropyield v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Options => display::print_options(),
        Command::Inspect => {
            let model = open_model(&cli.model)?;
            display::print_model_info(&model.describe());
        }
        Command::Predict(args) => {
            let mut model = open_model(&cli.model)?;
            let req = args.request();
            let row = req.encode().context("invalid prediction input")?;
            let tons_per_ha = model.predict(&row).context("running yield model")?;

            if args.json {
                println!("{}", display::prediction_json(&req, &row, tons_per_ha)?);
            } else {
                display::print_prediction(&req, tons_per_ha);
            }
        }
        Command::Form => {
            let mut model = open_model(&cli.model)?;
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();
            let n = form::run(&mut input, &mut out, model.as_mut())?;
            tracing::info!(predictions = n, "form session finished");
        }
    }

    Ok(())
}

/// The model must load before anything can be predicted.
fn open_model(path: &Path) -> anyhow::Result<Box<dyn Regressor>> {
    load_model(path).with_context(|| format!("loading yield model from {}", path.display()))
}
