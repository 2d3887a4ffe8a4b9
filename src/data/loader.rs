//! CSV Data Loader Module
//! Loads the housing sales file with Polars, validates its schema and cleans it
//! into the immutable dataset shared by every view.

use crate::config::DashboardConfig;
use crate::data::schema::{
    is_numeric_dtype, PropertyType, DATE, DROPPED_COLUMNS, PRICE, REGION, REQUIRED_CATEGORICAL,
    REQUIRED_NUMERIC,
};
use crate::stats::StatsCalculator;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Accepted date layouts, day-first before ISO.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
    #[error("Column '{column}' should be {expected}, found {found}")]
    WrongType {
        column: String,
        expected: &'static str,
        found: String,
    },
    #[error("Row {row}: cannot parse date '{value}' (expected day-first, e.g. 3/12/2016)")]
    InvalidDate { row: usize, value: String },
}

/// Price slider configuration derived from the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub marks: Vec<SliderMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderMark {
    pub value: i64,
    pub label: String,
}

/// The cleaned housing table.
///
/// Every row has a price, every numeric column is `Float64` without nulls and
/// `Date` (when present) is a calendar date. Cloning is cheap and never copies
/// column data.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Validate and clean a raw table.
    pub fn from_raw(mut raw: DataFrame) -> Result<Self, LoaderError> {
        type_blank_numeric_columns(&mut raw)?;
        validate_schema(&raw)?;
        let df = clean(raw)?;
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Slider range in price units of `config.price_scale`, marks every `mark_spacing`.
    pub fn price_slider_bounds(&self, config: &DashboardConfig) -> SliderBounds {
        let prices: Vec<f64> = self
            .df
            .column(PRICE)
            .ok()
            .and_then(|col| col.f64().ok())
            .map(|ca| ca.into_iter().flatten().collect())
            .unwrap_or_default();

        let stats = StatsCalculator::compute_descriptive_stats(&prices);
        let (min, max) = if stats.count == 0 {
            (0.0, 0.0)
        } else {
            (
                (stats.min / config.price_scale).floor(),
                (stats.max / config.price_scale).floor(),
            )
        };

        let spacing = config.mark_spacing.max(1) as usize;
        let dollars_per_unit = (config.price_scale / 1000.0) as i64;
        let marks = (0..max as i64 + config.mark_spacing)
            .step_by(spacing)
            .map(|value| SliderMark {
                value,
                label: format!("${}k", value * dollars_per_unit),
            })
            .collect();

        SliderBounds {
            min,
            max,
            step: config.slider_step,
            marks,
        }
    }

    /// Sorted unique region names, nulls excluded.
    pub fn region_options(&self) -> Vec<String> {
        self.df
            .column(REGION)
            .ok()
            .and_then(|col| {
                col.as_materialized_series().str().ok().map(|ca| {
                    ca.into_iter()
                        .flatten()
                        .map(|s| s.to_string())
                        .collect::<BTreeSet<_>>()
                })
            })
            .map(|regions| regions.into_iter().collect())
            .unwrap_or_default()
    }

    /// Human property type labels in dropdown order.
    pub fn property_type_options() -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = PropertyType::ALL.iter().map(|t| t.label()).collect();
        labels.sort();
        labels
    }
}

/// Loads the housing CSV from disk.
pub struct DataLoader {
    file_path: PathBuf,
}

impl DataLoader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Read the whole file into a raw table. Parse failures are fatal.
    pub fn read_raw(&self) -> Result<DataFrame, LoaderError> {
        if !self.file_path.exists() {
            return Err(LoaderError::NotFound(self.file_path.clone()));
        }

        let df = LazyCsvReader::new(self.file_path.clone())
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        debug!(rows = df.height(), columns = df.width(), "Read raw CSV");
        Ok(df)
    }

    /// Read, validate and clean the file.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        info!(path = %self.file_path.display(), "Loading housing data");
        let dataset = Dataset::from_raw(self.read_raw()?)?;
        info!(rows = dataset.height(), "Housing data ready");
        Ok(dataset)
    }
}

/// Load the housing file at `path` and return the cleaned dataset.
pub fn load_and_clean_data(path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
    DataLoader::new(path.as_ref()).load()
}

/// A required numeric column with no values at all is inferred as text by the
/// CSV reader. Retype it as an all-null `Float64` so cleaning can fill it.
fn type_blank_numeric_columns(df: &mut DataFrame) -> Result<(), LoaderError> {
    for name in REQUIRED_NUMERIC {
        let blank = df
            .column(name)
            .map(|col| col.dtype() == &DataType::String && col.null_count() == col.len())
            .unwrap_or(false);
        if blank {
            warn!(column = name, "Column is entirely empty, reading it as numeric");
            let retyped = Column::full_null(name.into(), df.height(), &DataType::Float64);
            df.with_column(retyped)?;
        }
    }
    Ok(())
}

fn validate_schema(df: &DataFrame) -> Result<(), LoaderError> {
    let schema = df.schema();

    for name in REQUIRED_NUMERIC {
        let dtype = schema
            .get(name)
            .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))?;
        if !is_numeric_dtype(dtype) {
            return Err(LoaderError::WrongType {
                column: name.to_string(),
                expected: "numeric",
                found: dtype.to_string(),
            });
        }
    }

    for name in REQUIRED_CATEGORICAL {
        let dtype = schema
            .get(name)
            .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))?;
        if !matches!(dtype, DataType::String) {
            return Err(LoaderError::WrongType {
                column: name.to_string(),
                expected: "text",
                found: dtype.to_string(),
            });
        }
    }

    Ok(())
}

fn clean(raw: DataFrame) -> Result<DataFrame, LoaderError> {
    let before = raw.height();
    let mut df = raw.lazy().filter(col(PRICE).is_not_null()).collect()?;
    debug!(dropped = before - df.height(), "Dropped rows without a price");

    for name in DROPPED_COLUMNS {
        if df.get_column_index(name).is_some() {
            df = df.drop(name)?;
        }
    }

    fill_numeric_with_median(&mut df)?;

    if df.get_column_index(DATE).is_some() {
        parse_dates(&mut df)?;
    }

    Ok(df)
}

/// Replace nulls (and NaN) in every numeric column with that column's median.
fn fill_numeric_with_median(df: &mut DataFrame) -> Result<(), LoaderError> {
    let numeric: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect();

    for name in numeric {
        let values = df.column(&name)?.cast(&DataType::Float64)?;
        let ca = values.f64()?;

        let observed: Vec<f64> = ca.into_iter().flatten().filter(|v| !v.is_nan()).collect();
        let missing = df.height() - observed.len();
        let median = StatsCalculator::median(&observed);
        let fill = if median.is_nan() {
            if df.height() > 0 {
                warn!(column = %name, "Column has no observed values, filling with 0");
            }
            0.0
        } else {
            median
        };

        if missing > 0 {
            debug!(column = %name, missing, fill, "Imputing missing values with median");
        }

        let filled: Vec<f64> = ca
            .into_iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => x,
                _ => fill,
            })
            .collect();
        df.with_column(Column::new(name.as_str().into(), filled))?;
    }

    Ok(())
}

/// Parse a day-first date such as `3/12/2016`.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Convert the text `Date` column into a calendar date column.
fn parse_dates(df: &mut DataFrame) -> Result<(), LoaderError> {
    let dtype = df.column(DATE)?.dtype().clone();
    match dtype {
        DataType::Date => Ok(()),
        DataType::String => {
            let epoch = NaiveDate::default();
            let text = df.column(DATE)?.as_materialized_series().str()?;

            let mut days: Vec<Option<i32>> = Vec::with_capacity(text.len());
            for (row, value) in text.into_iter().enumerate() {
                match value.map(str::trim).filter(|v| !v.is_empty()) {
                    None => days.push(None),
                    Some(v) => {
                        let date = parse_day_first(v).ok_or_else(|| LoaderError::InvalidDate {
                            row,
                            value: v.to_string(),
                        })?;
                        days.push(Some((date - epoch).num_days() as i32));
                    }
                }
            }

            let dates = Column::new(DATE.into(), days).cast(&DataType::Date)?;
            df.with_column(dates)?;
            Ok(())
        }
        other => Err(LoaderError::WrongType {
            column: DATE.to_string(),
            expected: "day-first date text",
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{CAR, LANDSIZE};
    use crate::test_support::{sample_dataset, write_csv, SAMPLE_CSV};

    fn f64_column(ds: &Dataset, name: &str) -> Vec<Option<f64>> {
        ds.frame().column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn drops_rows_without_price() {
        let ds = sample_dataset();
        assert_eq!(ds.height(), 7);
        assert!(f64_column(&ds, PRICE).iter().all(|p| p.is_some()));
    }

    #[test]
    fn drops_uninformative_columns() {
        let ds = sample_dataset();
        for name in DROPPED_COLUMNS {
            assert!(ds.frame().get_column_index(name).is_none(), "{name} kept");
        }
    }

    #[test]
    fn imputes_numeric_columns_with_post_drop_median() {
        let ds = sample_dataset();
        let car = f64_column(&ds, CAR);
        let landsize = f64_column(&ds, LANDSIZE);
        assert!(car.iter().chain(landsize.iter()).all(|v| v.is_some()));
        // Airport West row lacks Car; observed [1,0,0,1,1,2]
        assert_eq!(car[3], Some(1.0));
        // Alphington row lacks Landsize; observed [202,156,134,303,0,120]
        assert_eq!(landsize[6], Some(145.0));
    }

    #[test]
    fn blank_numeric_column_is_filled_with_zero() {
        let file = write_csv(
            "Suburb,Rooms,Type,Price,Date,Distance,Bedroom2,Bathroom,Car,Landsize,Lattitude,Longtitude,Regionname
A,3,h,500000,1/01/2017,5.0,3,1,,0,-37.80,144.90,Northern Metropolitan
B,4,h,750000,1/02/2017,7.0,4,2,,100,-37.81,144.91,Northern Metropolitan
",
        );
        let ds = load_and_clean_data(file.path()).unwrap();
        assert_eq!(ds.frame().column(CAR).unwrap().dtype(), &DataType::Float64);
        assert_eq!(f64_column(&ds, CAR), vec![Some(0.0), Some(0.0)]);
        assert_eq!(f64_column(&ds, LANDSIZE), vec![Some(0.0), Some(100.0)]);
    }

    #[test]
    fn every_numeric_column_is_complete() {
        let ds = sample_dataset();
        for col in ds.frame().get_columns() {
            if is_numeric_dtype(col.dtype()) {
                assert_eq!(col.null_count(), 0, "{} has nulls", col.name());
            }
        }
    }

    #[test]
    fn parses_dates_day_first() {
        assert_eq!(parse_day_first("3/12/2016"), NaiveDate::from_ymd_opt(2016, 12, 3));
        assert_eq!(parse_day_first("04/02/2016"), NaiveDate::from_ymd_opt(2016, 2, 4));
        assert_eq!(parse_day_first("2016-02-04"), NaiveDate::from_ymd_opt(2016, 2, 4));
        assert_eq!(parse_day_first("yesterday"), None);

        let ds = sample_dataset();
        assert_eq!(ds.frame().column(DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_and_clean_data("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let file = write_csv("Suburb,Type,Price\nA,h,100\n");
        let err = load_and_clean_data(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "Rooms"));
    }

    #[test]
    fn text_in_numeric_column_is_reported() {
        let csv = SAMPLE_CSV.replacen(",2.5,", ",far,", 1);
        let file = write_csv(&csv);
        let err = load_and_clean_data(file.path()).unwrap_err();
        assert!(
            matches!(err, LoaderError::WrongType { ref column, .. } if column == "Distance"),
            "{err}"
        );
    }

    #[test]
    fn unparsable_date_is_fatal() {
        let csv = SAMPLE_CSV.replacen("3/12/2016", "someday", 1);
        let file = write_csv(&csv);
        let err = load_and_clean_data(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDate { row: 0, .. }), "{err}");
    }

    #[test]
    fn slider_bounds_follow_price_range() {
        let bounds = sample_dataset().price_slider_bounds(&DashboardConfig::default());
        assert_eq!(bounds.min, 70.0);
        assert_eq!(bounds.max, 160.0);
        assert_eq!(bounds.step, 10.0);
        let labels: Vec<&str> = bounds.marks.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["$0k", "$1000k", "$2000k"]);
    }

    #[test]
    fn dropdown_options() {
        let ds = sample_dataset();
        assert_eq!(
            ds.region_options(),
            vec![
                "Northern Metropolitan",
                "Southern Metropolitan",
                "Western Metropolitan"
            ]
        );
        assert_eq!(
            Dataset::property_type_options(),
            vec!["House", "Townhouse", "Unit"]
        );
    }
}
