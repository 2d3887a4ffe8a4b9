//! Dashboard Dispatcher
//! Owns the widget state of both pages, routes widget events to the matching
//! view and hands every recomputed update to the registered render sinks.

use crate::charts::{ChartSpec, RenderError};
use crate::config::DashboardConfig;
use crate::data::{Dataset, SliderBounds};
use crate::views::{AnalysisUpdate, AnalysisView, HomeUpdate, HomeView, KpiCard, ViewError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Consumer of recomputed page updates (SVG files, JSON output, a UI...).
pub trait RenderSink {
    fn render(&mut self, update: &ViewUpdate) -> Result<(), RenderError>;
}

/// Output of one recomputation, tagged by page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewUpdate {
    Home(HomeUpdate),
    Analysis(AnalysisUpdate),
}

impl ViewUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            ViewUpdate::Home(_) => "home",
            ViewUpdate::Analysis(_) => "analysis",
        }
    }

    /// Named chart specs of the page, in display order.
    pub fn charts(&self) -> Vec<(&'static str, &ChartSpec)> {
        match self {
            ViewUpdate::Home(update) => update.charts().to_vec(),
            ViewUpdate::Analysis(update) => update.charts().to_vec(),
        }
    }
}

/// Widget values events are applied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetState {
    /// Slider position, in slider units.
    pub price_range: (f64, f64),
    pub region: Option<String>,
    /// Human type label (`House`, `Townhouse`, `Unit`).
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PriceRangeChanged(f64, f64),
    RegionSelected(Option<String>),
    PropertyTypeSelected(Option<String>),
}

/// Static page data: KPI cards, slider configuration and dropdown options.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: Vec<KpiCard>,
    pub slider: SliderBounds,
    pub regions: Vec<String>,
    pub property_types: Vec<&'static str>,
}

pub struct Dashboard {
    home: HomeView,
    analysis: AnalysisView,
    regions: Vec<String>,
    state: WidgetState,
    sinks: Vec<Box<dyn RenderSink>>,
}

impl Dashboard {
    pub fn new(dataset: Dataset, config: &DashboardConfig) -> Result<Self, ViewError> {
        let analysis = AnalysisView::new(&dataset)?;
        let regions = dataset.region_options();
        let home = HomeView::new(dataset, config);
        let state = WidgetState {
            price_range: home.full_range(),
            region: None,
            property_type: None,
        };
        info!(regions = regions.len(), "Dashboard initialised");

        Ok(Self {
            home,
            analysis,
            regions,
            state,
            sinks: Vec::new(),
        })
    }

    pub fn add_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            kpis: self.analysis.kpis().cards(),
            slider: self.home.slider().clone(),
            regions: self.regions.clone(),
            property_types: Dataset::property_type_options(),
        }
    }

    /// Apply a widget event and recompute the page it belongs to.
    pub fn handle(&mut self, event: UiEvent) -> Result<ViewUpdate, DashboardError> {
        debug!(?event, "Handling event");
        let update = match event {
            UiEvent::PriceRangeChanged(low, high) => {
                self.state.price_range = if low > high { (high, low) } else { (low, high) };
                self.home_update()?
            }
            UiEvent::RegionSelected(region) => {
                self.state.region = region;
                self.analysis_update()?
            }
            UiEvent::PropertyTypeSelected(property_type) => {
                self.state.property_type = property_type;
                self.analysis_update()?
            }
        };

        self.publish(&update)?;
        Ok(update)
    }

    /// Recompute both pages from the current state.
    pub fn refresh_all(&mut self) -> Result<Vec<ViewUpdate>, DashboardError> {
        let updates = vec![self.home_update()?, self.analysis_update()?];
        for update in &updates {
            self.publish(update)?;
        }
        Ok(updates)
    }

    fn home_update(&self) -> Result<ViewUpdate, ViewError> {
        Ok(ViewUpdate::Home(self.home.recompute(self.state.price_range)?))
    }

    fn analysis_update(&self) -> Result<ViewUpdate, ViewError> {
        Ok(ViewUpdate::Analysis(self.analysis.recompute(
            self.state.region.as_deref(),
            self.state.property_type.as_deref(),
        )?))
    }

    fn publish(&mut self, update: &ViewUpdate) -> Result<(), RenderError> {
        for sink in &mut self.sinks {
            sink.render(update)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_dataset;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        seen: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RenderSink for Recorder {
        fn render(&mut self, update: &ViewUpdate) -> Result<(), RenderError> {
            self.seen.borrow_mut().push(update.name());
            Ok(())
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(sample_dataset(), &DashboardConfig::default()).unwrap()
    }

    #[test]
    fn initial_state_covers_full_range() {
        let dash = dashboard();
        assert_eq!(
            dash.state(),
            &WidgetState {
                price_range: (70.0, 160.0),
                region: None,
                property_type: None,
            }
        );
    }

    #[test]
    fn refresh_all_renders_both_pages() {
        let mut dash = dashboard();
        let seen = Rc::new(RefCell::new(Vec::new()));
        dash.add_sink(Box::new(Recorder { seen: seen.clone() }));

        let updates = dash.refresh_all().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].charts().len(), 3);
        assert_eq!(updates[1].charts().len(), 6);
        assert_eq!(*seen.borrow(), vec!["home", "analysis"]);
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let mut dash = dashboard();
        let update = dash.handle(UiEvent::PriceRangeChanged(150.0, 100.0)).unwrap();
        assert_eq!(dash.state().price_range, (100.0, 150.0));
        match update {
            ViewUpdate::Home(home) => assert_eq!(home.listing_count, 3),
            other => panic!("expected home update, got {}", other.name()),
        }
    }

    #[test]
    fn dropdown_events_route_to_analysis() {
        let mut dash = dashboard();
        let seen = Rc::new(RefCell::new(Vec::new()));
        dash.add_sink(Box::new(Recorder { seen: seen.clone() }));

        dash.handle(UiEvent::RegionSelected(Some("Southern Metropolitan".to_string())))
            .unwrap();
        let update = dash
            .handle(UiEvent::PropertyTypeSelected(Some("House".to_string())))
            .unwrap();

        assert_eq!(dash.state().region.as_deref(), Some("Southern Metropolitan"));
        match update {
            ViewUpdate::Analysis(analysis) => match analysis.price_by_suburb {
                ChartSpec::Bar(bar) => {
                    assert_eq!(bar.categories, vec!["Albert Park"]);
                    assert_eq!(bar.values, vec![1_542_000.0]);
                }
                other => panic!("unexpected chart {other:?}"),
            },
            other => panic!("expected analysis update, got {}", other.name()),
        }
        assert_eq!(*seen.borrow(), vec!["analysis", "analysis"]);
    }

    #[test]
    fn summary_lists_options_and_kpis() {
        let summary = dashboard().summary();
        assert_eq!(summary.kpis.len(), 4);
        assert_eq!(summary.kpis[3].value, "7");
        assert_eq!(summary.regions.len(), 3);
        assert_eq!(summary.property_types, vec!["House", "Townhouse", "Unit"]);
    }

    #[test]
    fn updates_serialize_with_view_tag() {
        let mut dash = dashboard();
        let update = dash.handle(UiEvent::PriceRangeChanged(100.0, 150.0)).unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["view"], "home");
        assert_eq!(json["listing_count"], 3);
        assert_eq!(json["histogram"]["kind"], "histogram");
    }
}
