//! Melbourne Housing Dashboard
//!
//! Loads the Melbourne housing sales file, cleans it once, and turns widget
//! values (price slider, region and property type dropdowns) into declarative
//! chart specs and short insight text.

pub mod charts;
pub mod config;
pub mod data;
pub mod format;
pub mod stats;
pub mod views;

#[cfg(test)]
mod test_support;

pub use config::DashboardConfig;
pub use data::{load_and_clean_data, Dataset, LoaderError};
pub use views::{Dashboard, UiEvent, ViewUpdate};
