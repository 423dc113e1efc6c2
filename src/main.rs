mod catalog;
mod config;
mod elements;
mod geometry;
mod orbit;
mod precompute;
mod service;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::config::Config;
use crate::service::SkyService;

#[derive(Parser)]
#[command(name = "sky-cache")]
#[command(about = "Satellite visibility and trajectory cache")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh loops and HTTP API until interrupted
    Serve,
    /// Refresh once and print the currently visible objects
    Once,
    /// Validate the configuration file
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Once => once(config).await,
        Commands::CheckConfig => {
            let o = &config.observer;
            println!(
                "Config is valid (observer {:.4}, {:.4}, {:.3} km; {} objects max)",
                o.latitude_deg, o.longitude_deg, o.altitude_km, config.catalog.max_objects
            );
            ExitCode::SUCCESS
        }
    }
}

async fn serve(config: Config) -> ExitCode {
    let mut service = match SkyService::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = service.start() {
        eprintln!("Failed to start service: {}", e);
        return ExitCode::FAILURE;
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
        log::info!("Shutdown requested");
    };

    let result = web::run_server(&config.web.bind, service.query(), shutdown).await;
    service.stop().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn once(config: Config) -> ExitCode {
    let service = match SkyService::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = service.refresh_catalog().await;
    println!(
        "Loaded {} of {} candidates ({} failed, {} filtered, {} duplicate, {} over cap)",
        report.loaded,
        report.candidates,
        report.failed,
        report.filtered,
        report.duplicates,
        report.skipped_over_cap
    );

    service.precompute_now().await;

    let query = service.query();
    let snapshot = query.snapshot();
    let visible = query.visible_now();
    if snapshot.is_empty() {
        println!("Nothing rises above the minimum elevation in the next window");
        return ExitCode::SUCCESS;
    }
    println!(
        "{} objects visible in the next window ({} tracks cached at {})",
        visible.len(),
        snapshot.len(),
        snapshot
            .generated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    );
    for sat in visible {
        println!(
            "  {:<28} az {:>6.1}  el {:>5.1}  range {:>8.1} km  peak {:>5.1}  {:?}",
            sat.name,
            sat.azimuth_deg,
            sat.elevation_deg,
            sat.range_km,
            sat.peak_elevation_deg,
            sat.category
        );
    }

    ExitCode::SUCCESS
}
