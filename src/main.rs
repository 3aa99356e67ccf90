//! Calimate - Automated Tektronix oscilloscope calibration
//!
//! Finds instruments over VISA and shows imported CSV test results.

mod config;
mod data;
mod format;
mod gui;
mod instrument;
mod session;

use anyhow::Context;
use config::AppConfig;
use eframe::egui;
use gui::CalimateApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    log::info!("Current working directory: {}", cwd.display());
    let config = AppConfig::load_or_default(&cwd);
    let connector = instrument::connector(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1050.0, 600.0])
            .with_min_inner_size([700.0, 400.0])
            .with_title(format!("Calimate v{}", session::APP_VERSION)),
        ..Default::default()
    };

    eframe::run_native(
        "Calimate",
        options,
        Box::new(|cc| Ok(Box::new(CalimateApp::new(cc, config, connector)))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}
