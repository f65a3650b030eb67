// Hide console window in release builds (Windows GUI app)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod cli;
mod config;
mod docuri;
mod savegame;
mod search;
mod service;
mod source;
mod state;
mod task;
mod ui;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    let default_filter = if args.output.verbose {
        "debug"
    } else {
        "sasync=debug,info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Subcommands run headless; the browser starts when none is given
    if let Some(command) = args.command {
        return cli::run(command, &args.addresses, args.port, &args.output).await;
    }

    tracing::info!("Starting sasync");

    let config = config::Config::load()?;

    let endpoint = match service::ServiceEndpoint::from_candidates(&args.addresses, args.port) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            tracing::error!("{}. Pass at least one --address. Exiting.", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Using address: '{}'", endpoint);

    let client = service::ServiceClient::new(endpoint)?;

    // Configure native options
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([520.0, 680.0])
        .with_min_inner_size([420.0, 480.0])
        .with_title("sasync");

    let native_options = eframe::NativeOptions {
        viewport,
        persist_window: true, // Save/restore window size and position
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "sasync",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::SasyncApp::new(cc, config, client)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))?;

    Ok(())
}
