pub mod encoding;
pub mod error;
pub mod features;
pub mod request;

pub use encoding::{Categorical, Crop, FieldOptions, Region, SoilType, WeatherCondition, YesNo};
pub use error::{EncodingError, RequestError};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow, feature_row_schema};
pub use request::PredictionRequest;
