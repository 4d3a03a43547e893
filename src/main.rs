mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let source = config.data_source();

    // A dataset that cannot be loaded at startup is fatal.
    let dataset = data::loader::load_source(&source)
        .with_context(|| format!("loading sales data from {source}"))?;
    log::info!(
        "Loaded {} rows from {source} (extra columns: {:?})",
        dataset.len(),
        dataset.extra_columns
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let app = SalesDashboardApp::new(dataset, source);
    eframe::run_native(
        &config.title,
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
