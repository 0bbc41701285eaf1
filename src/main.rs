//! rustcast CLI - one-shot forecasts from the terminal

use anyhow::Result;
use clap::{Parser, Subcommand};
use rustcast::application::system::Application;
use rustcast::config::Config;
use rustcast::interfaces::report::{render_report, write_trajectory_csv};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one forecast and print the report
    Predict {
        /// Also export the trajectory as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the raw JSON result instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Print the model status
    Status,
    /// Check startup prerequisites (exits non-zero when one fails)
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for the report / JSON
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Predict { csv, json } => {
            let symbol = config.market_data.symbol.clone();
            let app = Application::build(config)?;
            let result = app.orchestrator.generate_forecast().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_report(&result, &symbol));
            }

            if let Some(path) = csv {
                write_trajectory_csv(&result, &path)?;
                info!("Trajectory written to {:?}", path);
            }
        }
        Commands::Status => {
            let app = Application::build(config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&app.orchestrator.model_status())?
            );
        }
        Commands::Check => {
            let checks = Application::check_prerequisites(&config);
            for check in &checks {
                let mark = if check.passed { "OK" } else { "MISSING" };
                println!("[{}] {}: {}", mark, check.name, check.detail);
            }
            if checks.iter().any(|c| !c.passed) {
                anyhow::bail!("startup prerequisites not met");
            }
        }
    }

    Ok(())
}
