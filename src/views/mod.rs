//! Views module - page controllers turning widget values into chart specs

mod analysis;
mod dashboard;
mod home;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use analysis::{AnalysisUpdate, AnalysisView, KpiCard, Kpis, CORRELATION_COLUMNS};
pub use dashboard::{
    Dashboard, DashboardError, DashboardSummary, RenderSink, UiEvent, ViewUpdate, WidgetState,
};
pub use home::{insight_text, HomeUpdate, HomeView};

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Failed to aggregate data: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid price range [{low}, {high}]")]
    InvalidRange { low: f64, high: f64 },
}
