//! Housing Dataset Schema
//! Column names, required column sets and property type codes.

use polars::prelude::DataType;
use serde::Serialize;

pub const PRICE: &str = "Price";
pub const ROOMS: &str = "Rooms";
pub const DISTANCE: &str = "Distance";
pub const BEDROOM2: &str = "Bedroom2";
pub const BATHROOM: &str = "Bathroom";
pub const CAR: &str = "Car";
pub const LANDSIZE: &str = "Landsize";
// Spelling follows the source data file.
pub const LATITUDE: &str = "Lattitude";
pub const LONGITUDE: &str = "Longtitude";

pub const SUBURB: &str = "Suburb";
pub const REGION: &str = "Regionname";
pub const TYPE: &str = "Type";
pub const DATE: &str = "Date";

/// Derived by the analysis view, never present in the source file.
pub const PRICE_PER_SQM: &str = "Price_per_sqm";

pub const REQUIRED_NUMERIC: [&str; 9] = [
    PRICE, ROOMS, DISTANCE, BEDROOM2, BATHROOM, CAR, LANDSIZE, LATITUDE, LONGITUDE,
];

pub const REQUIRED_CATEGORICAL: [&str; 3] = [SUBURB, REGION, TYPE];

/// High-missing or uninformative columns removed during cleaning.
pub const DROPPED_COLUMNS: [&str; 4] = ["Address", "BuildingArea", "YearBuilt", "CouncilArea"];

/// Property type as coded in the `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PropertyType {
    House,
    Townhouse,
    Unit,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::House,
        PropertyType::Townhouse,
        PropertyType::Unit,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "h" => Some(PropertyType::House),
            "t" => Some(PropertyType::Townhouse),
            "u" => Some(PropertyType::Unit),
            _ => None,
        }
    }

    /// Reverse lookup used by the type dropdown.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn code(self) -> &'static str {
        match self {
            PropertyType::House => "h",
            PropertyType::Townhouse => "t",
            PropertyType::Unit => "u",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Unit => "Unit",
        }
    }
}

/// Human label for a raw type code. Unknown codes keep their raw text.
pub fn type_name(code: &str) -> String {
    PropertyType::from_code(code)
        .map(|t| t.label().to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}
