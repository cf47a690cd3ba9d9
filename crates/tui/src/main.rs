mod app;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};
use tripdeck_core::{
    catalog::TripCatalog,
    config::{self, AppConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let catalog = TripCatalog::new(config.fetch_delay());

    let mut app = app::TripdeckApp::new(config, catalog);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("tripdeck.log");

    let env_filter = EnvFilter::from_default_env();

    // Only a file layer: stdout belongs to the alternate screen.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
