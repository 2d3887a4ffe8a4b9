//! Charts module - declarative chart specs and SVG rendering

mod renderer;
mod spec;

pub use renderer::{RenderError, SvgRenderer};
pub use spec::{
    BarChart, BoxChart, BoxTrace, ChartSpec, ColorValue, HeatmapChart, HistogramChart, HoverData,
    LineChart, LinePoint, MapChart, MapPoint, ScatterChart, ScatterPoint,
};
