// src/main.rs

mod config;
mod errors;
mod report;
mod roc;
mod roc_plot;
mod traffic_data;
mod types;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use report::SweepReport;
use roc_plot::PlotLayout;
use traffic_data::TrafficLoader;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intent_roc=info")),
        )
        .init();

    info!("🚗 Speed/Intent ROC Sweep Starting");

    let config_path = std::env::var("ROC_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = types::Config::load_or_default(&config_path)?;

    let dataset = TrafficLoader::new(config.data.clone())
        .load()
        .context("Failed to load traffic station data")?;

    let result = roc::run_sweep(&dataset.observations).context("Threshold sweep failed")?;
    report::log_summary(&result);

    let layout = PlotLayout::new(config.output.width, config.output.height);
    render_chart(&result, &layout, &config)?;

    report::save_curve_csv(&result.points, result.observations, &config.curve_path())?;
    let summary = SweepReport::new(&config.data.input_dir, &dataset, &result);
    report::save_report(&summary, &config.report_path())?;

    info!("✓ Done");
    Ok(())
}

#[cfg(feature = "render")]
fn render_chart(result: &roc::SweepResult, layout: &PlotLayout, config: &types::Config) -> Result<()> {
    roc_plot::render_roc_chart(result, layout, &config.chart_path())
}

#[cfg(not(feature = "render"))]
fn render_chart(_result: &roc::SweepResult, _layout: &PlotLayout, config: &types::Config) -> Result<()> {
    tracing::warn!(
        "Built without the `render` feature, skipping {}",
        config.chart_path().display()
    );
    Ok(())
}
