//! A single prediction request as entered on the form.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::{Categorical, Crop, Region, SoilType, WeatherCondition, YesNo};
use crate::error::RequestError;
use crate::features::FeatureRow;

pub const MIN_RAINFALL_MM: f64 = 0.0;
pub const MIN_TEMPERATURE_C: f64 = -10.0;
pub const MAX_TEMPERATURE_C: f64 = 50.0;
pub const MIN_DAYS_TO_HARVEST: u32 = 1;

pub const DEFAULT_RAINFALL_MM: f64 = 100.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
pub const DEFAULT_DAYS_TO_HARVEST: u32 = 60;

/// User-facing inputs for one yield prediction.
///
/// Created fresh for each prediction and discarded once the model has
/// produced an estimate. [`Default`] gives the values the form starts with:
/// the first entry of every dropdown and the numeric defaults above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub region: Region,
    pub soil_type: SoilType,
    pub crop: Crop,
    pub rainfall_mm: f64,
    pub temperature_celsius: f64,
    pub fertilizer_used: YesNo,
    pub irrigation_used: YesNo,
    pub weather_condition: WeatherCondition,
    pub days_to_harvest: u32,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            region: Region::East,
            soil_type: SoilType::Chalky,
            crop: Crop::Barley,
            rainfall_mm: DEFAULT_RAINFALL_MM,
            temperature_celsius: DEFAULT_TEMPERATURE_C,
            fertilizer_used: YesNo::No,
            irrigation_used: YesNo::No,
            weather_condition: WeatherCondition::Cloudy,
            days_to_harvest: DEFAULT_DAYS_TO_HARVEST,
        }
    }
}

impl PredictionRequest {
    /// Check the numeric inputs against the form's widget bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        check_rainfall(self.rainfall_mm)?;
        check_temperature(self.temperature_celsius)?;
        check_days(self.days_to_harvest)?;
        Ok(())
    }

    /// Validate, then encode into the model's feature row.
    pub fn encode(&self) -> Result<FeatureRow, RequestError> {
        self.validate()?;

        let row = FeatureRow::new([
            f64::from(self.region.code()),
            f64::from(self.soil_type.code()),
            f64::from(self.crop.code()),
            self.rainfall_mm,
            self.temperature_celsius,
            f64::from(self.fertilizer_used.code()),
            f64::from(self.irrigation_used.code()),
            f64::from(self.weather_condition.code()),
            f64::from(self.days_to_harvest),
        ]);
        debug!(?row, "encoded prediction request");
        Ok(row)
    }
}

pub fn check_rainfall(value: f64) -> Result<f64, RequestError> {
    let field = "Rainfall_mm";
    finite(field, value)?;
    if value < MIN_RAINFALL_MM {
        return Err(RequestError::OutOfRange {
            field,
            value,
            bound: format!(">= {MIN_RAINFALL_MM:.1}"),
        });
    }
    Ok(value)
}

pub fn check_temperature(value: f64) -> Result<f64, RequestError> {
    let field = "Temperature_Celsius";
    finite(field, value)?;
    if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&value) {
        return Err(RequestError::OutOfRange {
            field,
            value,
            bound: format!("between {MIN_TEMPERATURE_C:.1} and {MAX_TEMPERATURE_C:.1}"),
        });
    }
    Ok(value)
}

pub fn check_days(value: u32) -> Result<u32, RequestError> {
    if value < MIN_DAYS_TO_HARVEST {
        return Err(RequestError::OutOfRange {
            field: "Days_to_Harvest",
            value: f64::from(value),
            bound: format!(">= {MIN_DAYS_TO_HARVEST}"),
        });
    }
    Ok(value)
}

fn finite(field: &'static str, value: f64) -> Result<(), RequestError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RequestError::NotFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_NAMES;

    #[test]
    fn default_matches_form() {
        let req = PredictionRequest::default();
        assert_eq!(req.region, Region::East);
        assert_eq!(req.weather_condition, WeatherCondition::Cloudy);
        assert_eq!(req.rainfall_mm, 100.0);
        assert_eq!(req.temperature_celsius, 25.0);
        assert_eq!(req.days_to_harvest, 60);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn encode_places_codes_in_trained_order() {
        let req = PredictionRequest {
            region: Region::West,
            soil_type: SoilType::Sandy,
            crop: Crop::Rice,
            rainfall_mm: 897.08,
            temperature_celsius: 27.68,
            fertilizer_used: YesNo::No,
            irrigation_used: YesNo::Yes,
            weather_condition: WeatherCondition::Cloudy,
            days_to_harvest: 122,
        };
        let row = req.encode().unwrap();
        assert_eq!(
            row.values(),
            &[3.0, 4.0, 3.0, 897.08, 27.68, 0.0, 1.0, 0.0, 122.0]
        );
        assert_eq!(row.iter().next(), Some((FEATURE_NAMES[0], 3.0)));
    }

    #[test]
    fn rejects_negative_rainfall() {
        let req = PredictionRequest {
            rainfall_mm: -0.1,
            ..Default::default()
        };
        let err = req.encode().unwrap_err();
        assert!(matches!(
            err,
            RequestError::OutOfRange {
                field: "Rainfall_mm",
                ..
            }
        ));
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        assert!(check_temperature(-10.0).is_ok());
        assert!(check_temperature(50.0).is_ok());
        assert!(check_temperature(50.1).is_err());
        assert!(check_temperature(-10.5).is_err());
    }

    #[test]
    fn rejects_zero_days() {
        let err = check_days(0).unwrap_err();
        assert_eq!(err.to_string(), "Days_to_Harvest must be >= 1, got 0");
    }

    #[test]
    fn rejects_non_finite() {
        let req = PredictionRequest {
            temperature_celsius: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            req.validate(),
            Err(RequestError::NotFinite {
                field: "Temperature_Celsius"
            })
        ));
    }

    #[test]
    fn json_uses_labels() {
        let json = r#"{
            "region": "North",
            "soil_type": "Loam",
            "crop": "Wheat",
            "rainfall_mm": 420.0,
            "temperature_celsius": 18.5,
            "fertilizer_used": "Yes",
            "irrigation_used": "No",
            "weather_condition": "Sunny",
            "days_to_harvest": 95
        }"#;
        let req: PredictionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.crop, Crop::Wheat);
        assert_eq!(req.fertilizer_used, YesNo::Yes);
        let row = req.encode().unwrap();
        assert_eq!(row.get("Weather_Condition"), Some(2.0));
    }
}
