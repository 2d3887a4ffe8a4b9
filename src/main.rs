//! Melbourne Housing Dashboard - command line front end
//!
//! Loads the housing sales file once, then prints page updates as JSON or
//! exports every chart as SVG.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use melb_dash::charts::{RenderError, SvgRenderer};
use melb_dash::config::{DashboardConfig, DEFAULT_DATA_PATH};
use melb_dash::data::load_and_clean_data;
use melb_dash::views::{Dashboard, RenderSink, UiEvent, ViewUpdate};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "melb-dash",
    version,
    about = "Melbourne Housing Dashboard",
    long_about = "Filter, aggregate and chart Melbourne housing sales.\n\n\
                  Prices on the command line are slider units (tens of thousands of AUD).\n\n\
                  EXAMPLES:\n  \
                  melb-dash summary\n  \
                  melb-dash home --low 100 --high 150\n  \
                  melb-dash analysis --region \"Northern Metropolitan\" --type House\n  \
                  melb-dash export --out-dir charts"
)]
struct Cli {
    /// Path to the housing sales CSV
    #[arg(short, long, global = true, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// KPI cards, price slider configuration and dropdown options
    Summary,
    /// Home page charts for a price range
    Home(PriceRange),
    /// Analysis page charts for a region and property type
    Analysis(Selection),
    /// Write every chart of both pages as SVG
    Export {
        /// Output directory for the SVG files
        #[arg(short, long, default_value = "charts")]
        out_dir: PathBuf,

        #[command(flatten)]
        range: PriceRange,

        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Args, Debug)]
struct PriceRange {
    /// Lower slider bound; defaults to the cheapest listing
    #[arg(long)]
    low: Option<f64>,

    /// Upper slider bound; defaults to the most expensive listing
    #[arg(long)]
    high: Option<f64>,
}

#[derive(Args, Debug)]
struct Selection {
    /// Region name, e.g. "Southern Metropolitan"
    #[arg(long)]
    region: Option<String>,

    /// Property type label (House, Townhouse, Unit)
    #[arg(long = "type", value_name = "TYPE")]
    property_type: Option<String>,
}

/// Prints every update to stdout as pretty JSON.
struct JsonRenderer;

impl RenderSink for JsonRenderer {
    fn render(&mut self, update: &ViewUpdate) -> Result<(), RenderError> {
        println!("{}", serde_json::to_string_pretty(update)?);
        Ok(())
    }
}

/// Log to stderr so stdout carries only JSON.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn price_event(dashboard: &Dashboard, range: &PriceRange) -> UiEvent {
    let (low, high) = dashboard.state().price_range;
    UiEvent::PriceRangeChanged(range.low.unwrap_or(low), range.high.unwrap_or(high))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = DashboardConfig::default().with_data_path(&cli.data);
    let dataset = load_and_clean_data(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    let mut dashboard = Dashboard::new(dataset, &config).context("Failed to build dashboard")?;

    match cli.command {
        Command::Summary => print_json(&dashboard.summary())?,
        Command::Home(range) => {
            dashboard.add_sink(Box::new(JsonRenderer));
            let event = price_event(&dashboard, &range);
            dashboard.handle(event)?;
        }
        Command::Analysis(selection) => {
            // sinks see only the final selection
            dashboard.handle(UiEvent::RegionSelected(selection.region))?;
            dashboard.add_sink(Box::new(JsonRenderer));
            dashboard.handle(UiEvent::PropertyTypeSelected(selection.property_type))?;
        }
        Command::Export {
            out_dir,
            range,
            selection,
        } => {
            let event = price_event(&dashboard, &range);
            dashboard.handle(event)?;
            dashboard.handle(UiEvent::RegionSelected(selection.region))?;
            dashboard.handle(UiEvent::PropertyTypeSelected(selection.property_type))?;

            dashboard.add_sink(Box::new(SvgRenderer::new(&out_dir)));
            let updates = dashboard.refresh_all().context("Failed to export charts")?;
            let charts: usize = updates.iter().map(|u| u.charts().len()).sum();
            info!(charts, dir = %out_dir.display(), "Export complete");
        }
    }

    Ok(())
}
