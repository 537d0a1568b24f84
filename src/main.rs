mod app;
mod cli;
mod config;
mod domain;
mod gateway;
mod infrastructure;
mod profile;
mod report;
mod sync;
#[cfg(test)]
mod testing;
mod view;

use anyhow::Result;
use clap::Parser;
use infrastructure::{directories, logging, signal};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();
    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let (shutdown, _) = signal::StopSignal::new();
    signal::install_signal_handlers(shutdown.clone());

    let app = app::ReelSpiritApp::initialize(config, shutdown)?;
    app.run(args).await
}
