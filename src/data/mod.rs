//! Data module - CSV loading, cleaning and filtering

mod loader;
mod processor;
pub mod schema;

pub use loader::{
    load_and_clean_data, parse_day_first, DataLoader, Dataset, LoaderError, SliderBounds,
    SliderMark,
};
pub use processor::DataProcessor;
pub use schema::PropertyType;
