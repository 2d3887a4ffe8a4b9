//! Statistics module - numeric summaries behind every chart

mod calculator;

pub use calculator::{BoxSummary, DescriptiveStats, HistogramBin, StatsCalculator};
