//! Skin Insight - Skin Analysis Client & Chart Dashboard
//!
//! Sends skin photos to the analysis service and charts the results over time.

mod api;
mod capture;
mod charts;
mod config;
mod gui;
mod session;
mod snapshot;

use anyhow::Context;
use api::ApiClient;
use eframe::egui;
use gui::SkinInsightApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = ApiClient::new(&config.api.base_url, config.api.timeout())
        .context("failed to build HTTP client")?;
    info!(api = %config.api.base_url, "starting Skin Insight");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Skin Insight"),
        ..Default::default()
    };

    eframe::run_native(
        "Skin Insight",
        options,
        Box::new(move |cc| Ok(Box::new(SkinInsightApp::new(cc, config, client)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
