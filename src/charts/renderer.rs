//! SVG Chart Renderer
//! Draws chart specs to SVG files with the plotters SVG backend.
//!
//! One file per chart, named `<view>_<chart>.svg`. Specs without data get a
//! centered "No data" placeholder instead of empty axes.

use crate::charts::{
    BarChart, BoxChart, ChartSpec, ColorValue, HeatmapChart, HistogramChart, LineChart, MapChart,
    ScatterChart,
};
use crate::views::{RenderSink, ViewUpdate};
use chrono::Duration;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

// Series colors (RGB)
const PALETTE: [RGBColor; 6] = [
    RGBColor(91, 155, 213),  // Blue
    RGBColor(237, 125, 49),  // Orange
    RGBColor(112, 173, 71),  // Green
    RGBColor(255, 192, 0),   // Gold
    RGBColor(112, 48, 160),  // Purple
    RGBColor(165, 165, 165), // Gray
];
const MISSING: RGBColor = RGBColor(200, 200, 200);

const DEFAULT_SIZE: (u32, u32) = (1000, 600);

type Root<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to draw {chart}: {message}")]
    Drawing { chart: String, message: String },
    #[error("Failed to serialize update: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes every chart of an update into `out_dir`.
pub struct SvgRenderer {
    out_dir: PathBuf,
    size: (u32, u32),
    written: Vec<PathBuf>,
}

impl SvgRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            size: DEFAULT_SIZE,
            written: Vec::new(),
        }
    }

    /// Files written so far, in render order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn chart_path(&self, view: &str, chart: &str) -> PathBuf {
        self.out_dir.join(format!("{view}_{chart}.svg"))
    }

    /// Draw a single spec to `path`.
    pub fn render_chart(&self, path: &Path, spec: &ChartSpec) -> Result<(), RenderError> {
        draw_chart(path, self.size, spec).map_err(|e| RenderError::Drawing {
            chart: spec.title().to_string(),
            message: e.to_string(),
        })
    }
}

impl RenderSink for SvgRenderer {
    fn render(&mut self, update: &ViewUpdate) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|source| RenderError::Io {
            path: self.out_dir.clone(),
            source,
        })?;

        for (name, spec) in update.charts() {
            let path = self.chart_path(update.name(), name);
            self.render_chart(&path, spec)?;
            debug!(path = %path.display(), "Chart written");
            self.written.push(path);
        }
        info!(
            view = update.name(),
            dir = %self.out_dir.display(),
            "Rendered charts"
        );
        Ok(())
    }
}

fn draw_chart(path: &Path, size: (u32, u32), spec: &ChartSpec) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    if spec.is_empty() {
        let center = ((size.0 / 2) as i32, (size.1 / 2) as i32);
        root.draw(&Text::new(
            "No data",
            center,
            ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        root.present()?;
        return Ok(());
    }

    match spec {
        ChartSpec::Bar(chart) => draw_bar(&root, chart)?,
        ChartSpec::Scatter(chart) => draw_scatter(&root, chart)?,
        ChartSpec::Line(chart) => draw_line(&root, chart)?,
        ChartSpec::Histogram(chart) => draw_histogram(&root, chart)?,
        ChartSpec::Map(chart) => draw_map(&root, chart)?,
        ChartSpec::Heatmap(chart) => draw_heatmap(&root, chart)?,
        ChartSpec::Box(chart) => draw_box(&root, chart)?,
    }

    root.present()?;
    Ok(())
}

fn draw_bar(root: &Root<'_>, chart: &BarChart) -> DrawResult {
    let n = chart.values.len();
    let (y_min, y_max) = padded_range(chart.values.iter().copied().chain(std::iter::once(0.0)));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_min.min(0.0)..y_max)?;

    let label = |x: &f64| category_label(&chart.categories, *x);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(chart.values.iter().enumerate().map(|(i, &v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], PALETTE[0].filled())
    }))?;
    Ok(())
}

fn draw_scatter(root: &Root<'_>, chart: &ScatterChart) -> DrawResult {
    let (x_min, x_max) = padded_range(chart.points.iter().map(|p| p.x));
    let (y_min, y_max) = padded_range(chart.points.iter().map(|p| p.y));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let values: Vec<&ColorValue> = chart.points.iter().map(|p| &p.color).collect();
    let (colors, legend) = point_colors(&values);
    ctx.draw_series(
        chart
            .points
            .iter()
            .zip(&colors)
            .map(|(p, color)| Circle::new((p.x, p.y), 3, color.mix(0.8).filled())),
    )?;

    if !legend.is_empty() {
        for (name, color) in legend {
            ctx.draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
                .label(name)
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_line(root: &Root<'_>, chart: &LineChart) -> DrawResult {
    // is_empty() was checked by the caller
    let origin = chart.points[0].x;
    let xs: Vec<f64> = chart
        .points
        .iter()
        .map(|p| (p.x - origin).num_days() as f64)
        .collect();
    let (x_min, x_max) = padded_range(xs.iter().copied());
    let (y_min, y_max) = padded_range(chart.points.iter().map(|p| p.y));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let month_label = |x: &f64| {
        origin
            .checked_add_signed(Duration::days(x.round() as i64))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default()
    };
    ctx.configure_mesh()
        .x_label_formatter(&month_label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let series: Vec<(f64, f64)> = xs.iter().zip(&chart.points).map(|(&x, p)| (x, p.y)).collect();
    ctx.draw_series(LineSeries::new(series.iter().copied(), PALETTE[0].stroke_width(2)))?;
    ctx.draw_series(
        series
            .iter()
            .map(|&point| Circle::new(point, 3, PALETTE[0].filled())),
    )?;
    Ok(())
}

fn draw_histogram(root: &Root<'_>, chart: &HistogramChart) -> DrawResult {
    let (x_min, x_max) = padded_range(chart.bins.iter().flat_map(|b| [b.start, b.end]));
    let top = chart.bins.iter().map(|b| b.count).max().unwrap_or(0);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..(top as f64 * 1.1).max(1.0))?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(chart.bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], PALETTE[0].mix(0.8).filled())
    }))?;
    Ok(())
}

fn draw_map(root: &Root<'_>, chart: &MapChart) -> DrawResult {
    let (lon_min, lon_max) = padded_range(chart.points.iter().map(|p| p.lon));
    let (lat_min, lat_max) = padded_range(chart.points.iter().map(|p| p.lat));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_min..lon_max, lat_min..lat_max)?;

    ctx.configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    let prices: Vec<ColorValue> = chart
        .points
        .iter()
        .map(|p| ColorValue::Scale(p.color))
        .collect();
    let (colors, _) = point_colors(&prices.iter().collect::<Vec<_>>());
    ctx.draw_series(chart.points.iter().zip(&colors).map(|(p, color)| {
        let radius = ((p.size.max(0.0) * 2.0) as i32).clamp(2, 12);
        Circle::new((p.lon, p.lat), radius, color.mix(0.7).filled())
    }))?;
    Ok(())
}

fn draw_heatmap(root: &Root<'_>, chart: &HeatmapChart) -> DrawResult {
    let n = chart.labels.len();
    let range = -0.5..(n as f64 - 0.5);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(range.clone(), range)?;

    let label = |v: &f64| category_label(&chart.labels, *v);
    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .draw()?;

    let cells: Vec<(f64, f64, f64)> = chart
        .matrix
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(move |(j, &r)| (j as f64, i as f64, r))
        })
        .collect();

    ctx.draw_series(cells.iter().map(|&(x, y, r)| {
        let color = if r.is_finite() {
            scale_color((r + 1.0) / 2.0)
        } else {
            MISSING
        };
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    let text_style = ("sans-serif", 12)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    ctx.draw_series(
        cells
            .iter()
            .filter(|(_, _, r)| r.is_finite())
            .map(|&(x, y, r)| Text::new(format!("{r:.2}"), (x, y), text_style.clone())),
    )?;
    Ok(())
}

fn draw_box(root: &Root<'_>, chart: &BoxChart) -> DrawResult {
    let names: Vec<String> = chart.traces.iter().map(|t| t.name.clone()).collect();
    let (y_min, y_max) = padded_range(
        chart
            .traces
            .iter()
            .filter_map(|t| t.summary.as_ref())
            .flat_map(|s| [s.min, s.max]),
    );

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), y_min..y_max)?;

    let label = |x: &f64| category_label(&names, *x);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&label)
        .y_desc(chart.y_label.as_str())
        .draw()?;

    for (i, trace) in chart.traces.iter().enumerate() {
        let Some(s) = &trace.summary else {
            continue;
        };
        let x = i as f64;
        let color = PALETTE[i % PALETTE.len()];

        ctx.draw_series([
            Rectangle::new([(x - 0.3, s.q1), (x + 0.3, s.q3)], color.mix(0.3).filled()),
            Rectangle::new([(x - 0.3, s.q1), (x + 0.3, s.q3)], color.stroke_width(2)),
        ])?;
        ctx.draw_series([
            PathElement::new(vec![(x - 0.3, s.median), (x + 0.3, s.median)], color.stroke_width(2)),
            PathElement::new(vec![(x, s.q3), (x, s.upper_whisker)], color.stroke_width(1)),
            PathElement::new(vec![(x, s.q1), (x, s.lower_whisker)], color.stroke_width(1)),
            PathElement::new(
                vec![(x - 0.15, s.upper_whisker), (x + 0.15, s.upper_whisker)],
                color.stroke_width(1),
            ),
            PathElement::new(
                vec![(x - 0.15, s.lower_whisker), (x + 0.15, s.lower_whisker)],
                color.stroke_width(1),
            ),
        ])?;
        ctx.draw_series(
            s.outliers
                .iter()
                .map(|&v| Circle::new((x, v), 3, color.filled())),
        )?;
    }
    Ok(())
}

/// Axis range over the finite values with 5% padding on both sides.
/// Falls back to `0..1` when nothing is finite and widens a single value.
fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if min != 0.0 {
        min.abs() * 0.05
    } else {
        1.0
    };
    (min - pad, max + pad)
}

/// Category name at an integer axis position, blank elsewhere.
fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Map `[0, 1]` onto blue (low) through white to red (high).
fn scale_color(value: f64) -> RGBColor {
    let v = value.clamp(0.0, 1.0);
    if v < 0.5 {
        let t = v * 2.0;
        RGBColor((255.0 * t) as u8, (255.0 * t) as u8, 255)
    } else {
        let t = (v - 0.5) * 2.0;
        RGBColor(255, (255.0 * (1.0 - t)) as u8, (255.0 * (1.0 - t)) as u8)
    }
}

/// Fill color of each point plus the category legend.
///
/// Categories take palette colors in sorted order; numeric values are scaled
/// between their finite min and max.
fn point_colors(values: &[&ColorValue]) -> (Vec<RGBColor>, Vec<(String, RGBColor)>) {
    let categories: BTreeSet<&str> = values
        .iter()
        .filter_map(|v| match v {
            ColorValue::Category(name) => Some(name.as_str()),
            ColorValue::Scale(_) => None,
        })
        .collect();
    let legend: Vec<(String, RGBColor)> = categories
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), PALETTE[i % PALETTE.len()]))
        .collect();

    let (lo, hi) = values
        .iter()
        .filter_map(|v| match v {
            ColorValue::Scale(s) if s.is_finite() => Some(*s),
            _ => None,
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let colors = values
        .iter()
        .map(|v| match v {
            ColorValue::Category(name) => legend
                .iter()
                .find(|(label, _)| label == name)
                .map(|(_, color)| *color)
                .unwrap_or(MISSING),
            ColorValue::Scale(s) if !s.is_finite() => MISSING,
            ColorValue::Scale(s) if hi > lo => scale_color((s - lo) / (hi - lo)),
            ColorValue::Scale(_) => scale_color(0.5),
        })
        .collect();

    (colors, legend)
}
