//! Dashboard settings shared by the loader, the views and the CLI.

use serde::Serialize;
use std::path::PathBuf;

/// Default location of the housing sales file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "melb_data.csv";

/// Settings for loading and aggregating the housing data.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Slider values are expressed in multiples of this many dollars.
    pub price_scale: f64,
    pub histogram_bins: usize,
    pub slider_step: f64,
    /// Distance between labelled slider marks, in slider units.
    pub mark_spacing: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            price_scale: 10_000.0,
            histogram_bins: 50,
            slider_step: 10.0,
            mark_spacing: 100,
        }
    }
}

impl DashboardConfig {
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}
