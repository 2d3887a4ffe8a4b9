//! Chart Specifications
//! Declarative chart values: a kind tag plus the exact series that drive it.
//! Non-finite numbers serialize as `null`.

use crate::stats::{BoxSummary, HistogramBin};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Extra fields shown when hovering a point.
pub type HoverData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChart),
    Scatter(ScatterChart),
    Line(LineChart),
    Histogram(HistogramChart),
    Map(MapChart),
    Heatmap(HeatmapChart),
    Box(BoxChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(c) => &c.title,
            ChartSpec::Scatter(c) => &c.title,
            ChartSpec::Line(c) => &c.title,
            ChartSpec::Histogram(c) => &c.title,
            ChartSpec::Map(c) => &c.title,
            ChartSpec::Heatmap(c) => &c.title,
            ChartSpec::Box(c) => &c.title,
        }
    }

    /// True when the chart has no data to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Bar(c) => c.values.is_empty(),
            ChartSpec::Scatter(c) => c.points.is_empty(),
            ChartSpec::Line(c) => c.points.is_empty(),
            ChartSpec::Histogram(c) => c.bins.is_empty(),
            ChartSpec::Map(c) => c.points.is_empty(),
            ChartSpec::Heatmap(c) => c.labels.is_empty(),
            ChartSpec::Box(c) => c.traces.iter().all(|t| t.summary.is_none()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl BarChart {
    pub fn from_pairs(
        title: &str,
        x_label: &str,
        y_label: &str,
        pairs: Vec<(String, f64)>,
    ) -> Self {
        let (categories, values) = pairs.into_iter().unzip();
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            categories,
            values,
        }
    }
}

/// Point color: a continuous value or a category name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    Scale(f64),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: ColorValue,
    pub hover: HoverData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color_label: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: NaiveDate,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub color: f64,
    pub size: f64,
    pub hover: HoverData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapChart {
    pub title: String,
    pub color_label: String,
    pub size_label: String,
    pub points: Vec<MapPoint>,
}

/// Square matrix; `matrix[i][j]` pairs `labels[i]` with `labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapChart {
    pub title: String,
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTrace {
    pub name: String,
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub title: String,
    pub y_label: String,
    pub traces: Vec<BoxTrace>,
}
