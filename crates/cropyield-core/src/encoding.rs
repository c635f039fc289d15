//! Categorical code tables for the prediction form.
//!
//! Each dropdown on the form maps a human-readable label to the integer
//! code the yield model was trained on. The tables are fixed: codes are the
//! alphabetical rank of the label, as produced by the label encoder used at
//! training time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// A closed set of labels with fixed integer codes.
pub trait Categorical: Sized + Copy + PartialEq + 'static {
    /// Lowercase name used in error messages.
    const KIND: &'static str;

    /// Every variant, in code (and dropdown) order.
    const ALL: &'static [Self];

    fn code(self) -> u8;

    fn label(self) -> &'static str;

    /// Extra accepted spellings, matched case-insensitively.
    fn aliases() -> &'static [(&'static str, Self)] {
        &[]
    }

    /// Inverse of [`Categorical::code`].
    fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }

    /// Parse a label, ignoring case and surrounding whitespace.
    fn parse_label(s: &str) -> Result<Self, EncodingError> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(needle))
            .or_else(|| {
                Self::aliases()
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(needle))
                    .map(|&(_, v)| v)
            })
            .ok_or_else(|| EncodingError::UnknownLabel {
                kind: Self::KIND,
                label: needle.to_string(),
                allowed: Self::labels().join(", "),
            })
    }

    /// Labels in dropdown order.
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.label()).collect()
    }
}

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:literal {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
        $(aliases { $($alias:literal => $avariant:ident),+ $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl Categorical for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            $(
            fn aliases() -> &'static [(&'static str, Self)] {
                &[$(($alias, Self::$avariant)),+]
            }
            )?
        }

        impl FromStr for $name {
            type Err = EncodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_label(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

code_table! {
    /// Geographic region of the field.
    Region, kind = "region" {
        East = 0 => "East",
        North = 1 => "North",
        South = 2 => "South",
        West = 3 => "West",
    }
}

code_table! {
    /// Dominant soil type.
    SoilType, kind = "soil type" {
        Chalky = 0 => "Chalky",
        Clay = 1 => "Clay",
        Loam = 2 => "Loam",
        Peaty = 3 => "Peaty",
        Sandy = 4 => "Sandy",
        Silt = 5 => "Silt",
    }
}

code_table! {
    Crop, kind = "crop" {
        Barley = 0 => "Barley",
        Cotton = 1 => "Cotton",
        Maize = 2 => "Maize",
        Rice = 3 => "Rice",
        Soybean = 4 => "Soybean",
        Wheat = 5 => "Wheat",
    }
}

code_table! {
    /// Prevailing weather during the growing season.
    WeatherCondition, kind = "weather condition" {
        Cloudy = 0 => "Cloudy",
        Rainy = 1 => "Rainy",
        Sunny = 2 => "Sunny",
    }
}

code_table! {
    /// Boolean flag shown as a No/Yes dropdown (fertilizer, irrigation).
    YesNo, kind = "yes/no" {
        No = 0 => "No",
        Yes = 1 => "Yes",
    }
    aliases {
        "false" => No,
        "true" => Yes,
        "n" => No,
        "y" => Yes,
    }
}

impl YesNo {
    pub fn from_bool(b: bool) -> Self {
        if b { Self::Yes } else { Self::No }
    }

    pub fn as_bool(self) -> bool {
        self == Self::Yes
    }
}

impl From<bool> for YesNo {
    fn from(b: bool) -> Self {
        Self::from_bool(b)
    }
}

/// Dropdown contents for one categorical form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOptions {
    /// Feature column name the model expects.
    pub field: &'static str,
    /// Label shown on the form.
    pub prompt: &'static str,
    /// `(label, code)` pairs in dropdown order.
    pub choices: Vec<(&'static str, u8)>,
}

impl FieldOptions {
    fn of<T: Categorical>(field: &'static str, prompt: &'static str) -> Self {
        Self {
            field,
            prompt,
            choices: T::ALL.iter().map(|v| (v.label(), v.code())).collect(),
        }
    }
}

/// Every categorical field on the form, in form order.
pub fn options() -> Vec<FieldOptions> {
    vec![
        FieldOptions::of::<Region>("Region", "Region"),
        FieldOptions::of::<SoilType>("Soil_Type", "Soil Type"),
        FieldOptions::of::<Crop>("Crop", "Crop Type"),
        FieldOptions::of::<YesNo>("Fertilizer_Used", "Fertilizer Used"),
        FieldOptions::of::<YesNo>("Irrigation_Used", "Irrigation Used"),
        FieldOptions::of::<WeatherCondition>("Weather_Condition", "Weather Condition"),
    ]
}
