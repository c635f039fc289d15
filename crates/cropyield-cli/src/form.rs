//! Interactive prediction form on a line-oriented terminal.
//!
//! Prompts for every field in form order, offering the dropdown choices and
//! the default (taken on an empty answer). Invalid answers re-prompt. End of
//! input at any prompt ends the session cleanly.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use anyhow::Context;
use cropyield_ai::Regressor;
use cropyield_core::encoding::Categorical;
use cropyield_core::request::{check_days, check_rainfall, check_temperature};
use cropyield_core::{PredictionRequest, YesNo};
use tracing::{info, warn};

use crate::display;

/// Run the form until the user declines another prediction or input ends.
///
/// Returns the number of predictions made.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    model: &mut dyn Regressor,
) -> anyhow::Result<usize> {
    writeln!(out, "{}", display::TITLE)?;
    writeln!(out, "{}", display::SUBTITLE)?;

    let mut predictions = 0;
    loop {
        writeln!(out)?;
        let Some(req) = fill(input, out)? else {
            break;
        };

        let row = req.encode().context("encoding form inputs")?;
        let tons_per_ha = model.predict(&row).context("running yield model")?;
        predictions += 1;
        info!(prediction = tons_per_ha, crop = %req.crop, "form prediction");

        writeln!(out)?;
        write!(out, "{}", display::render_request(&req))?;
        writeln!(out)?;
        writeln!(out, "{}", display::format_yield(tons_per_ha))?;
        writeln!(out)?;

        match ask(input, out, "Predict another? (No/Yes)", YesNo::No, parse_label)? {
            Some(YesNo::Yes) => continue,
            _ => break,
        }
    }
    Ok(predictions)
}

/// Collect one request. `None` when input ends before the form is complete.
pub fn fill<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<PredictionRequest>> {
    let d = PredictionRequest::default();

    let Some(region) = choose(input, out, "Region", d.region)? else {
        return Ok(None);
    };
    let Some(soil_type) = choose(input, out, "Soil Type", d.soil_type)? else {
        return Ok(None);
    };
    let Some(crop) = choose(input, out, "Crop Type", d.crop)? else {
        return Ok(None);
    };
    let Some(fertilizer_used) = choose(input, out, "Fertilizer Used", d.fertilizer_used)? else {
        return Ok(None);
    };
    let Some(irrigation_used) = choose(input, out, "Irrigation Used", d.irrigation_used)? else {
        return Ok(None);
    };
    let Some(weather_condition) = choose(input, out, "Weather Condition", d.weather_condition)?
    else {
        return Ok(None);
    };

    let Some(rainfall_mm) = ask(input, out, "Rainfall (mm)", d.rainfall_mm, |s| {
        parse_number(s).and_then(|v| check_rainfall(v).map_err(|e| e.to_string()))
    })?
    else {
        return Ok(None);
    };
    let Some(temperature_celsius) = ask(input, out, "Temperature (°C)", d.temperature_celsius, |s| {
        parse_number(s).and_then(|v| check_temperature(v).map_err(|e| e.to_string()))
    })?
    else {
        return Ok(None);
    };
    let Some(days_to_harvest) = ask(input, out, "Days to Harvest", d.days_to_harvest, |s| {
        parse_number(s).and_then(|v| check_days(v).map_err(|e| e.to_string()))
    })?
    else {
        return Ok(None);
    };

    Ok(Some(PredictionRequest {
        region,
        soil_type,
        crop,
        rainfall_mm,
        temperature_celsius,
        fertilizer_used,
        irrigation_used,
        weather_condition,
        days_to_harvest,
    }))
}

/// Dropdown prompt: accepts a label or the code shown next to it.
fn choose<T, R, W>(input: &mut R, out: &mut W, prompt: &str, default: T) -> io::Result<Option<T>>
where
    T: Categorical + Display,
    R: BufRead,
    W: Write,
{
    let choices: Vec<String> = T::ALL
        .iter()
        .map(|v| format!("{}={}", v.label(), v.code()))
        .collect();
    let question = format!("{prompt} ({})", choices.join("/"));
    ask(input, out, &question, default, |s| match s.parse::<u32>() {
        Ok(n) => u8::try_from(n)
            .ok()
            .and_then(T::from_code)
            .ok_or_else(|| {
                format!(
                    "no {} with code {n} (codes 0 to {})",
                    T::KIND,
                    T::ALL.len() - 1
                )
            }),
        Err(_) => parse_label(s),
    })
}

/// Prompt until `parse` accepts the answer. Empty answers take `default`.
fn ask<T, R, W>(
    input: &mut R,
    out: &mut W,
    question: &str,
    default: T,
    parse: impl Fn(&str) -> Result<T, String>,
) -> io::Result<Option<T>>
where
    T: Display,
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{question} [{default}]: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        let answer = line.trim();
        if answer.is_empty() {
            return Ok(Some(default));
        }
        match parse(answer) {
            Ok(value) => return Ok(Some(value)),
            Err(msg) => {
                warn!(answer, %msg, "rejected form input");
                writeln!(out, "  {msg}")?;
            }
        }
    }
}

fn parse_label<T: Categorical>(s: &str) -> Result<T, String> {
    T::parse_label(s).map_err(|e| e.to_string())
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("'{s}' is not a valid number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropyield_ai::{ModelError, ModelInfo};
    use cropyield_core::{Crop, FeatureRow, Region, SoilType, WeatherCondition};
    use std::io::Cursor;

    /// Returns a fixed yield and remembers every row it was asked about.
    struct FixedModel {
        value: f64,
        seen: Vec<FeatureRow>,
    }

    impl FixedModel {
        fn new(value: f64) -> Self {
            Self {
                value,
                seen: Vec::new(),
            }
        }
    }

    impl Regressor for FixedModel {
        fn predict(&mut self, row: &FeatureRow) -> Result<f64, ModelError> {
            self.seen.push(*row);
            Ok(self.value)
        }

        fn describe(&self) -> ModelInfo {
            ModelInfo {
                format: "fixed",
                path: None,
                detail: String::new(),
            }
        }
    }

    struct BrokenModel;

    impl Regressor for BrokenModel {
        fn predict(&mut self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Err(ModelError::Inference("non-finite prediction NaN".into()))
        }

        fn describe(&self) -> ModelInfo {
            ModelInfo {
                format: "broken",
                path: None,
                detail: String::new(),
            }
        }
    }

    fn fill_from(answers: &str) -> (Option<PredictionRequest>, String) {
        let mut input = Cursor::new(answers.to_string());
        let mut out = Vec::new();
        let req = fill(&mut input, &mut out).unwrap();
        (req, String::from_utf8(out).unwrap())
    }

    #[test]
    fn empty_answers_take_defaults() {
        let (req, _) = fill_from("\n\n\n\n\n\n\n\n\n");
        assert_eq!(req, Some(PredictionRequest::default()));
    }

    #[test]
    fn labels_and_codes_are_accepted() {
        let (req, _) = fill_from("west\n4\nRice\nyes\n1\nsunny\n812.4\n-3.5\n120\n");
        let req = req.unwrap();
        assert_eq!(req.region, Region::West);
        assert_eq!(req.soil_type, SoilType::Sandy);
        assert_eq!(req.crop, Crop::Rice);
        assert_eq!(req.fertilizer_used, YesNo::Yes);
        assert_eq!(req.irrigation_used, YesNo::Yes);
        assert_eq!(req.weather_condition, WeatherCondition::Sunny);
        assert_eq!(req.rainfall_mm, 812.4);
        assert_eq!(req.temperature_celsius, -3.5);
        assert_eq!(req.days_to_harvest, 120);
    }

    #[test]
    fn invalid_answers_reprompt() {
        let (req, out) = fill_from("Mars\n9\nNorth\n\n\n\n\n\n-5\n10\n60.5\n20\n60.5\n0\n90\n");
        let req = req.unwrap();
        assert_eq!(req.region, Region::North);
        assert_eq!(req.rainfall_mm, 10.0);
        assert_eq!(req.temperature_celsius, 20.0);
        assert_eq!(req.days_to_harvest, 90);

        assert!(out.contains("unknown region 'Mars'"), "{out}");
        assert!(out.contains("no region with code 9 (codes 0 to 3)"), "{out}");
        assert!(out.contains("Rainfall_mm must be >= 0.0, got -5"), "{out}");
        assert!(out.contains("Temperature_Celsius must be between -10.0 and 50.0"), "{out}");
        assert!(out.contains("'60.5' is not a valid number"), "{out}");
        assert!(out.contains("Days_to_Harvest must be >= 1, got 0"), "{out}");
    }

    #[test]
    fn prompts_show_choices_and_defaults() {
        let (_, out) = fill_from("\n");
        assert!(out.contains("Region (East=0/North=1/South=2/West=3) [East]: "), "{out}");
        assert!(
            out.contains("Soil Type (Chalky=0/Clay=1/Loam=2/Peaty=3/Sandy=4/Silt=5) [Chalky]: "),
            "{out}"
        );
    }

    #[test]
    fn typed_codes_match_displayed_codes() {
        let (req, _) = fill_from("3\n\n\n1\n0\n\n\n\n\n");
        let req = req.unwrap();
        assert_eq!(req.region, Region::West);
        assert_eq!(req.fertilizer_used, YesNo::Yes);
        assert_eq!(req.irrigation_used, YesNo::No);

        let card = display::render_request(&req);
        assert!(card.contains("West (3)"), "{card}");
        assert!(card.contains("Yes (1)"), "{card}");
    }

    #[test]
    fn end_of_input_abandons_form() {
        let (req, _) = fill_from("South\nLoam\n");
        assert_eq!(req, None);
    }

    #[test]
    fn run_predicts_and_stops_on_no() {
        let mut input = Cursor::new("\n".repeat(9) + "no\n");
        let mut out = Vec::new();
        let mut model = FixedModel::new(4.678);

        let n = run(&mut input, &mut out, &mut model).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(n, 1);
        assert!(out.starts_with("Crop Yield Prediction Portal\n"));
        assert!(out.contains("The predicted crop yield is: 4.68 tons/ha"), "{out}");
        assert_eq!(model.seen.len(), 1);
        assert_eq!(model.seen[0].get("Rainfall_mm"), Some(100.0));
    }

    #[test]
    fn run_repeats_on_yes() {
        let answers = format!("{}yes\nRice\n{}", "\n".repeat(9), "\n".repeat(9));
        let mut input = Cursor::new(answers);
        let mut out = Vec::new();
        let mut model = FixedModel::new(3.0);

        // Second form: "Rice" is rejected as a region, the rest take
        // defaults, then input ends at "Predict another?".
        let n = run(&mut input, &mut out, &mut model).unwrap();
        assert_eq!(n, 2);
        assert_eq!(model.seen.len(), 2);
    }

    #[test]
    fn run_with_no_input_makes_no_predictions() {
        let mut input = Cursor::new(String::new());
        let mut out = Vec::new();
        let mut model = FixedModel::new(1.0);
        assert_eq!(run(&mut input, &mut out, &mut model).unwrap(), 0);
        assert!(model.seen.is_empty());
    }

    #[test]
    fn model_failure_stops_the_form() {
        let mut input = Cursor::new("\n".repeat(9) + "no\n");
        let mut out = Vec::new();

        let err = run(&mut input, &mut out, &mut BrokenModel).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("running yield model"), "{chain}");
        assert!(chain.contains("non-finite prediction"), "{chain}");

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("predicted crop yield"), "{out}");
        assert!(!out.contains("Inputs\n"), "{out}");
    }
}
