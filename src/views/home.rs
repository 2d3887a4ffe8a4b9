//! Home View
//! Price-range slider driving a histogram, a distance scatter, a map and a
//! short insight text.

use crate::charts::{
    ChartSpec, ColorValue, HistogramChart, HoverData, MapChart, MapPoint, ScatterChart,
    ScatterPoint,
};
use crate::config::DashboardConfig;
use crate::data::schema::{DISTANCE, LATITUDE, LONGITUDE, PRICE, ROOMS, SUBURB};
use crate::data::{DataProcessor, Dataset, SliderBounds};
use crate::format;
use crate::stats::StatsCalculator;
use crate::views::ViewError;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

/// Everything the home page shows for one slider position.
#[derive(Debug, Clone, Serialize)]
pub struct HomeUpdate {
    pub listing_count: usize,
    pub histogram: ChartSpec,
    pub scatter: ChartSpec,
    pub map: ChartSpec,
    pub insight: String,
}

impl HomeUpdate {
    pub fn charts(&self) -> [(&'static str, &ChartSpec); 3] {
        [
            ("price_histogram", &self.histogram),
            ("price_distance_scatter", &self.scatter),
            ("price_map", &self.map),
        ]
    }
}

/// Home page controller over the shared dataset.
pub struct HomeView {
    dataset: Dataset,
    price_scale: f64,
    histogram_bins: usize,
    slider: SliderBounds,
}

impl HomeView {
    pub fn new(dataset: Dataset, config: &DashboardConfig) -> Self {
        let slider = dataset.price_slider_bounds(config);
        Self {
            dataset,
            price_scale: config.price_scale,
            histogram_bins: config.histogram_bins,
            slider,
        }
    }

    pub fn slider(&self) -> &SliderBounds {
        &self.slider
    }

    /// Slider position covering every listing.
    pub fn full_range(&self) -> (f64, f64) {
        (self.slider.min, self.slider.max)
    }

    /// Recompute the home page for a slider range given in slider units.
    pub fn recompute(&self, price_range: (f64, f64)) -> Result<HomeUpdate, ViewError> {
        let (low, high) = price_range;
        if !low.is_finite() || !high.is_finite() {
            return Err(ViewError::InvalidRange { low, high });
        }

        let min_price = low * self.price_scale;
        let max_price = high * self.price_scale;
        let filtered =
            DataProcessor::filter_price_range(self.dataset.frame(), min_price, max_price)?;
        debug!(min_price, max_price, rows = filtered.height(), "Home filter applied");

        let prices = DataProcessor::f64_values(&filtered, PRICE)?;
        let median = StatsCalculator::median(&prices);

        Ok(HomeUpdate {
            listing_count: filtered.height(),
            histogram: self.price_histogram(&prices),
            scatter: Self::distance_scatter(&filtered)?,
            map: Self::price_map(&filtered)?,
            insight: insight_text(filtered.height(), min_price, max_price, median),
        })
    }

    fn price_histogram(&self, prices: &[f64]) -> ChartSpec {
        ChartSpec::Histogram(HistogramChart {
            title: "Distribution of Housing Prices in Selected Range".to_string(),
            x_label: "Price (AUD)".to_string(),
            y_label: "Number of Listings".to_string(),
            bins: StatsCalculator::histogram(prices, self.histogram_bins),
        })
    }

    fn distance_scatter(df: &DataFrame) -> Result<ChartSpec, ViewError> {
        let distance = DataProcessor::f64_values(df, DISTANCE)?;
        let price = DataProcessor::f64_values(df, PRICE)?;
        let rooms = DataProcessor::f64_values(df, ROOMS)?;
        let suburb = DataProcessor::string_values(df, SUBURB)?;

        let points = (0..df.height())
            .map(|i| ScatterPoint {
                x: distance[i],
                y: price[i],
                color: ColorValue::Scale(rooms[i]),
                hover: HoverData::from([
                    (SUBURB.to_string(), suburb[i].clone()),
                    (ROOMS.to_string(), format::number(rooms[i])),
                ]),
            })
            .collect();

        Ok(ChartSpec::Scatter(ScatterChart {
            title: "Relationship Between Price and Distance from CBD".to_string(),
            x_label: "Distance from CBD (km)".to_string(),
            y_label: "Price (AUD)".to_string(),
            color_label: ROOMS.to_string(),
            points,
        }))
    }

    fn price_map(df: &DataFrame) -> Result<ChartSpec, ViewError> {
        let lat = DataProcessor::f64_values(df, LATITUDE)?;
        let lon = DataProcessor::f64_values(df, LONGITUDE)?;
        let price = DataProcessor::f64_values(df, PRICE)?;
        let rooms = DataProcessor::f64_values(df, ROOMS)?;
        let suburb = DataProcessor::string_values(df, SUBURB)?;

        let points = (0..df.height())
            .map(|i| MapPoint {
                lat: lat[i],
                lon: lon[i],
                color: price[i],
                size: rooms[i],
                hover: HoverData::from([
                    (SUBURB.to_string(), suburb[i].clone()),
                    (PRICE.to_string(), format::number(price[i])),
                    (ROOMS.to_string(), format::number(rooms[i])),
                ]),
            })
            .collect();

        Ok(ChartSpec::Map(MapChart {
            title: "Geographical Distribution of Housing Prices".to_string(),
            color_label: PRICE.to_string(),
            size_label: ROOMS.to_string(),
            points,
        }))
    }
}

/// Summary paragraph under the home charts.
pub fn insight_text(count: usize, min_price: f64, max_price: f64, median: f64) -> String {
    format!(
        "You're currently viewing {} property listings priced between ${} and ${} AUD.\n\n\
         The median price for this segment is ${} AUD.\n\
         Notice how housing prices tend to decrease as the distance from Melbourne's Central \
         Business District (CBD) increases.\n\n\
         Use the interactive map above to explore the spatial distribution of homes, \
         their prices, and sizes across Melbourne's diverse suburbs.",
        format::count(count),
        format::number(min_price),
        format::number(max_price),
        format::thousands(median, 0),
    )
}
