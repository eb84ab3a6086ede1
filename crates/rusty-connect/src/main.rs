//! Rusty-Connect: a native wallet connection test bench

use eframe::egui;
use eyre::WrapErr;

use rusty_connect_adapters::ConnectConfig;

mod app;
mod bridge;
mod ui;

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ConnectConfig::from_env();
    tracing::info!(
        profile = ?config.runtime_profile,
        account_api = %config.account_api_base_url,
        rpc_configured = config.rpc_url.is_some(),
        "Starting Rusty-Connect"
    );
    let bridge = bridge::ConnectBridge::new(config).wrap_err("failed to initialize wallet bridge")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rusty-Connect")
            .with_inner_size([820.0, 640.0])
            .with_min_inner_size([560.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty-Connect",
        native_options,
        Box::new(|cc| Ok(Box::new(app::App::new(cc, bridge)))),
    )
    .map_err(|e| eyre::eyre!("eframe exited with error: {e}"))
}
