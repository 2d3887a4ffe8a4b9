//! Analysis View
//! Region and property-type dropdowns driving six market charts, plus KPI
//! cards computed once over the full dataset.

use crate::charts::{
    BarChart, BoxChart, BoxTrace, ChartSpec, ColorValue, HeatmapChart, HoverData, LineChart,
    LinePoint, ScatterChart, ScatterPoint,
};
use crate::data::schema::{
    BATHROOM, BEDROOM2, CAR, DISTANCE, LANDSIZE, PRICE, PRICE_PER_SQM, REGION, ROOMS, SUBURB,
};
use crate::data::{DataProcessor, Dataset, PropertyType};
use crate::format;
use crate::stats::StatsCalculator;
use crate::views::ViewError;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info};

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 8] = [
    PRICE,
    ROOMS,
    DISTANCE,
    BEDROOM2,
    BATHROOM,
    CAR,
    LANDSIZE,
    PRICE_PER_SQM,
];

/// Headline figures over the whole cleaned dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub avg_price: f64,
    pub median_price: f64,
    pub avg_rooms: f64,
    pub total_properties: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
}

impl Kpis {
    fn compute(df: &DataFrame) -> Result<Self, ViewError> {
        let prices = DataProcessor::f64_values(df, PRICE)?;
        let rooms = DataProcessor::f64_values(df, ROOMS)?;
        let price_stats = StatsCalculator::compute_descriptive_stats(&prices);

        Ok(Self {
            avg_price: price_stats.mean,
            median_price: price_stats.median,
            avg_rooms: StatsCalculator::mean(&rooms),
            total_properties: df.height(),
        })
    }

    /// Formatted card values as displayed on the page.
    pub fn cards(&self) -> Vec<KpiCard> {
        vec![
            KpiCard {
                title: "Average Price",
                value: format!("${}", format::thousands(self.avg_price, 0)),
            },
            KpiCard {
                title: "Median Price",
                value: format!("${}", format::thousands(self.median_price, 0)),
            },
            KpiCard {
                title: "Average Number of Rooms",
                value: format::thousands(self.avg_rooms, 1),
            },
            KpiCard {
                title: "Total Properties",
                value: format::count(self.total_properties),
            },
        ]
    }
}

/// The six analysis charts for one dropdown selection.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisUpdate {
    pub price_by_suburb: ChartSpec,
    pub rooms_vs_price: ChartSpec,
    pub price_over_time: ChartSpec,
    pub price_per_sqm_by_suburb: ChartSpec,
    pub correlation: ChartSpec,
    pub outliers: ChartSpec,
}

impl AnalysisUpdate {
    pub fn charts(&self) -> [(&'static str, &ChartSpec); 6] {
        [
            ("price_by_suburb", &self.price_by_suburb),
            ("rooms_vs_price", &self.rooms_vs_price),
            ("price_over_time", &self.price_over_time),
            ("price_per_sqm_by_suburb", &self.price_per_sqm_by_suburb),
            ("correlation_matrix", &self.correlation),
            ("outlier_detection", &self.outliers),
        ]
    }
}

/// Analysis page controller. Holds its own frame with `Price_per_sqm` derived.
pub struct AnalysisView {
    df: DataFrame,
    kpis: Kpis,
}

impl AnalysisView {
    pub fn new(dataset: &Dataset) -> Result<Self, ViewError> {
        let kpis = Kpis::compute(dataset.frame())?;
        let df = DataProcessor::with_price_per_sqm(dataset.frame())?;
        info!(
            rows = kpis.total_properties,
            avg_price = kpis.avg_price,
            "Analysis view ready"
        );
        Ok(Self { df, kpis })
    }

    pub fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    /// Recompute the six charts for the given dropdown values.
    ///
    /// `property_type` is a human label (`House`, `Townhouse`, `Unit`); an unknown
    /// label applies no type filter.
    pub fn recompute(
        &self,
        region: Option<&str>,
        property_type: Option<&str>,
    ) -> Result<AnalysisUpdate, ViewError> {
        let type_code = property_type
            .and_then(PropertyType::from_label)
            .map(PropertyType::code);
        let filtered = DataProcessor::filter_selection(&self.df, region, type_code)?;
        debug!(?region, ?type_code, rows = filtered.height(), "Analysis filter applied");

        let suburbs = DataProcessor::string_values(&filtered, SUBURB)?;
        let prices = DataProcessor::f64_values(&filtered, PRICE)?;
        let per_sqm = DataProcessor::f64_values(&filtered, PRICE_PER_SQM)?;

        Ok(AnalysisUpdate {
            price_by_suburb: ChartSpec::Bar(BarChart::from_pairs(
                "Average Price by Suburb",
                SUBURB,
                "Avg Price ($)",
                StatsCalculator::grouped_mean_desc(&suburbs, &prices),
            )),
            rooms_vs_price: Self::rooms_scatter(&filtered, &suburbs, &prices)?,
            price_over_time: Self::price_over_time(&filtered, &prices)?,
            price_per_sqm_by_suburb: ChartSpec::Bar(BarChart::from_pairs(
                "Average Price per Square Meter by Suburb",
                SUBURB,
                "Avg Price per sqm ($)",
                StatsCalculator::grouped_mean_desc(&suburbs, &per_sqm),
            )),
            correlation: Self::correlation(&filtered)?,
            outliers: Self::outliers(&prices, &per_sqm),
        })
    }

    fn rooms_scatter(
        df: &DataFrame,
        suburbs: &[String],
        prices: &[f64],
    ) -> Result<ChartSpec, ViewError> {
        let rooms = DataProcessor::f64_values(df, ROOMS)?;
        let regions = DataProcessor::string_values(df, REGION)?;
        let type_names = DataProcessor::type_names(df)?;

        let points = (0..df.height())
            .map(|i| ScatterPoint {
                x: rooms[i],
                y: prices[i],
                color: ColorValue::Category(type_names[i].clone()),
                hover: HoverData::from([
                    (SUBURB.to_string(), suburbs[i].clone()),
                    (PRICE.to_string(), format::number(prices[i])),
                    (ROOMS.to_string(), format::number(rooms[i])),
                    (REGION.to_string(), regions[i].clone()),
                ]),
            })
            .collect();

        Ok(ChartSpec::Scatter(ScatterChart {
            title: "Rooms vs Price by Property Type".to_string(),
            x_label: ROOMS.to_string(),
            y_label: PRICE.to_string(),
            color_label: "TypeName".to_string(),
            points,
        }))
    }

    fn price_over_time(df: &DataFrame, prices: &[f64]) -> Result<ChartSpec, ViewError> {
        let dates = DataProcessor::date_values(df)?;
        let points = StatsCalculator::monthly_mean(&dates, prices)
            .into_iter()
            .map(|(x, y)| LinePoint { x, y })
            .collect();

        Ok(ChartSpec::Line(LineChart {
            title: "Average Price Over Time".to_string(),
            x_label: "Date".to_string(),
            y_label: "Avg Price ($)".to_string(),
            points,
        }))
    }

    fn correlation(df: &DataFrame) -> Result<ChartSpec, ViewError> {
        let columns = CORRELATION_COLUMNS
            .iter()
            .map(|name| DataProcessor::f64_values(df, name))
            .collect::<Result<Vec<_>, _>>()?;

        let (labels, matrix) = if df.height() == 0 {
            (Vec::new(), Vec::new())
        } else {
            (
                CORRELATION_COLUMNS.iter().map(|s| s.to_string()).collect(),
                StatsCalculator::correlation_matrix(&columns),
            )
        };

        Ok(ChartSpec::Heatmap(HeatmapChart {
            title: "Correlation Matrix of Numerical Features".to_string(),
            labels,
            matrix,
        }))
    }

    fn outliers(prices: &[f64], per_sqm: &[f64]) -> ChartSpec {
        ChartSpec::Box(BoxChart {
            title: "Outlier Detection: Price and Price per Square Meter".to_string(),
            y_label: "Value ($)".to_string(),
            traces: vec![
                BoxTrace {
                    name: PRICE.to_string(),
                    summary: StatsCalculator::box_summary(prices),
                },
                BoxTrace {
                    name: PRICE_PER_SQM.to_string(),
                    summary: StatsCalculator::box_summary(per_sqm),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_dataset, scenario_dataset};
    use chrono::NaiveDate;

    fn view() -> AnalysisView {
        AnalysisView::new(&sample_dataset()).unwrap()
    }

    fn bar(spec: &ChartSpec) -> &BarChart {
        match spec {
            ChartSpec::Bar(chart) => chart,
            other => panic!("expected bar chart, got {other:?}"),
        }
    }

    #[test]
    fn kpis_cover_the_full_dataset() {
        let kpis = view().kpis().clone();
        assert_eq!(kpis.total_properties, 7);
        assert!((kpis.avg_price - 8_662_000.0 / 7.0).abs() < 1e-6);
        assert_eq!(kpis.median_price, 1_465_000.0);
        assert!((kpis.avg_rooms - 18.0 / 7.0).abs() < 1e-12);

        let values: Vec<String> = kpis.cards().into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["$1,237,429", "$1,465,000", "2.6", "7"]);
    }

    #[test]
    fn kpis_ignore_filters() {
        let analysis = view();
        analysis.recompute(Some("Southern Metropolitan"), None).unwrap();
        assert_eq!(analysis.kpis().total_properties, 7);
    }

    #[test]
    fn suburb_means_sorted_descending() {
        let update = view().recompute(None, None).unwrap();
        let chart = bar(&update.price_by_suburb);
        assert_eq!(
            chart.categories,
            vec!["Alphington", "Abbotsford", "Albert Park", "Airport West"]
        );
        assert!(chart.values.windows(2).all(|w| w[0] > w[1]));

        let per_sqm = bar(&update.price_per_sqm_by_suburb);
        assert!(per_sqm.values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn scenario_means_and_price_per_sqm() {
        let analysis = AnalysisView::new(&scenario_dataset()).unwrap();
        let update = analysis.recompute(None, None).unwrap();
        let chart = bar(&update.price_by_suburb);
        assert_eq!(chart.categories, vec!["B", "A"]);
        assert_eq!(chart.values, vec![750_000.0, 400_000.0]);

        let per_sqm = DataProcessor::f64_values(&analysis.df, PRICE_PER_SQM).unwrap();
        assert_eq!(per_sqm, vec![0.0, 7_500.0, 6_000.0]);
    }

    #[test]
    fn filters_by_region_and_type_label() {
        let analysis = view();
        let north = analysis
            .recompute(Some("Northern Metropolitan"), None)
            .unwrap();
        assert_eq!(
            bar(&north.price_by_suburb).categories,
            vec!["Alphington", "Abbotsford"]
        );

        let units = analysis.recompute(None, Some("Unit")).unwrap();
        assert_eq!(bar(&units.price_by_suburb).categories, vec!["Albert Park"]);
        match &units.rooms_vs_price {
            ChartSpec::Scatter(s) => {
                assert_eq!(s.points.len(), 1);
                assert_eq!(s.points[0].color, ColorValue::Category("Unit".to_string()));
            }
            other => panic!("unexpected chart {other:?}"),
        }

        // unknown label leaves the type unfiltered
        let all = analysis.recompute(None, Some("Castle")).unwrap();
        assert_eq!(bar(&all.price_by_suburb).categories.len(), 4);
    }

    #[test]
    fn blank_region_means_every_region() {
        let update = view().recompute(Some(""), None).unwrap();
        assert_eq!(
            bar(&update.price_by_suburb).categories,
            vec!["Alphington", "Abbotsford", "Albert Park", "Airport West"]
        );
    }

    #[test]
    fn monthly_prices_are_chronological() {
        let update = view().recompute(None, None).unwrap();
        let ChartSpec::Line(line) = &update.price_over_time else {
            panic!("expected line chart");
        };
        let months: Vec<NaiveDate> = line.points.iter().map(|p| p.x).collect();
        assert_eq!(months.len(), 5);
        assert!(months.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(months[0], NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
        let december = &line.points[3];
        assert_eq!(december.x, NaiveDate::from_ymd_opt(2016, 12, 1).unwrap());
        assert_eq!(december.y, 1_540_000.0);
    }

    #[test]
    fn correlation_matrix_has_deduplicated_columns() {
        let update = view().recompute(None, None).unwrap();
        let ChartSpec::Heatmap(heatmap) = &update.correlation else {
            panic!("expected heatmap");
        };
        assert_eq!(heatmap.labels.len(), 8);
        assert_eq!(
            heatmap.labels.iter().filter(|l| l.as_str() == LANDSIZE).count(),
            1
        );
        assert_eq!(heatmap.matrix.len(), 8);
        assert_eq!(heatmap.matrix[0][0], 1.0);
        assert!(heatmap.matrix.iter().all(|row| row.len() == 8));
    }

    #[test]
    fn boxplots_cover_price_and_price_per_sqm() {
        let update = view().recompute(None, None).unwrap();
        let ChartSpec::Box(boxes) = &update.outliers else {
            panic!("expected boxplot");
        };
        let names: Vec<&str> = boxes.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![PRICE, PRICE_PER_SQM]);
        let price = boxes.traces[0].summary.as_ref().unwrap();
        assert_eq!(price.count, 7);
        assert_eq!(price.median, 1_465_000.0);
    }

    #[test]
    fn empty_selection_yields_empty_specs() {
        let update = view()
            .recompute(Some("Western Metropolitan"), Some("Unit"))
            .unwrap();
        for (name, chart) in update.charts() {
            assert!(chart.is_empty(), "{name} should be empty");
        }
    }
}
