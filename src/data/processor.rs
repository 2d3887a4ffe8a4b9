//! Data Processor Module
//! Filtering, derived columns and value extraction over the cleaned dataset.
//! Every operation returns a fresh frame and leaves its input untouched.

use crate::data::schema::{type_name, DATE, LANDSIZE, PRICE, PRICE_PER_SQM, REGION, TYPE};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;

/// Handles filtering and transformation of the housing table.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep rows with `min_price <= Price <= max_price`.
    pub fn filter_price_range(
        df: &DataFrame,
        min_price: f64,
        max_price: f64,
    ) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .filter(
                col(PRICE)
                    .gt_eq(lit(min_price))
                    .and(col(PRICE).lt_eq(lit(max_price))),
            )
            .collect()
    }

    /// Keep rows matching the region and type code when given.
    /// An empty string is treated like no selection.
    pub fn filter_selection(
        df: &DataFrame,
        region: Option<&str>,
        type_code: Option<&str>,
    ) -> PolarsResult<DataFrame> {
        let mut lazy = df.clone().lazy();
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            lazy = lazy.filter(col(REGION).eq(lit(region)));
        }
        if let Some(code) = type_code.filter(|c| !c.is_empty()) {
            lazy = lazy.filter(col(TYPE).eq(lit(code)));
        }
        lazy.collect()
    }

    /// Price per square metre, zero when the land size is zero.
    ///
    /// Negative or non-finite inputs also give zero so the metric is always a
    /// finite, non-negative number.
    pub fn price_per_sqm(price: f64, landsize: f64) -> f64 {
        if landsize > 0.0 {
            let value = price / landsize;
            if value.is_finite() && value >= 0.0 {
                return value;
            }
        }
        0.0
    }

    /// Append the `Price_per_sqm` column.
    pub fn with_price_per_sqm(df: &DataFrame) -> PolarsResult<DataFrame> {
        let prices = Self::f64_values(df, PRICE)?;
        let landsizes = Self::f64_values(df, LANDSIZE)?;

        let per_sqm: Vec<f64> = prices
            .iter()
            .zip(&landsizes)
            .map(|(&price, &land)| Self::price_per_sqm(price, land))
            .collect();

        let mut out = df.clone();
        out.with_column(Column::new(PRICE_PER_SQM.into(), per_sqm))?;
        Ok(out)
    }

    /// Values of a numeric column as `f64`; nulls become NaN.
    pub fn f64_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<f64>> {
        let values = df.column(column)?.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Values of a text column; nulls become empty strings.
    pub fn string_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
        let values = df.column(column)?.as_materialized_series().str()?;
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// Calendar dates of each row; all `None` when the table has no `Date` column.
    pub fn date_values(df: &DataFrame) -> PolarsResult<Vec<Option<NaiveDate>>> {
        if df.get_column_index(DATE).is_none() {
            return Ok(vec![None; df.height()]);
        }

        // 1970-01-01
        let epoch = NaiveDate::default();
        let days = df.column(DATE)?.cast(&DataType::Int32)?;
        Ok(days
            .as_materialized_series()
            .i32()?
            .into_iter()
            .map(|d| d.and_then(|d| epoch.checked_add_signed(Duration::days(d as i64))))
            .collect())
    }

    /// Human type label of each row (`TypeName`).
    pub fn type_names(df: &DataFrame) -> PolarsResult<Vec<String>> {
        Ok(Self::string_values(df, TYPE)?
            .iter()
            .map(|code| type_name(code))
            .collect())
    }
}
