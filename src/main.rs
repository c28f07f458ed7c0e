//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `visa_directory` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use visa_directory::config::{Cli, Command};
use visa_directory::initialization::init_logger_with;
use visa_directory::{run_export, run_import, run_server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the working directory, or from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let result = match &cli.command {
        Command::Serve(_) => run_server(config).await,
        Command::Export(args) => run_export(&config, &args.output_dir).await.map(|report| {
            println!(
                "Exported {} businesses, {} reviews and {} reports to {}",
                report.businesses,
                report.reviews,
                report.reports,
                report.output_dir.display()
            );
        }),
        Command::Import(args) => run_import(&config, &args.input).await.map(|report| {
            println!(
                "Imported {} record{} ({} already present, {} invalid)",
                report.created(),
                if report.created() == 1 { "" } else { "s" },
                report.skipped(),
                report.businesses.invalid + report.reviews.invalid + report.reports.invalid
            );
        }),
    };

    if let Err(e) = result {
        eprintln!("visa_directory error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
