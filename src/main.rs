//! BulkCrop CLI
//!
//! Crops a batch of short videos to a rectangle drawn over a scaled preview.
//!
//! # Usage
//!
//! ```bash
//! bulkcrop crop clips/*.mp4 --crop 10,10,100,50 --container 640x360 -o out/
//! bulkcrop crop --manifest jobs.yaml
//! bulkcrop probe clip.mp4
//! bulkcrop validate clips/*.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use bulkcrop_cli::cli::{commands, Cli};
use bulkcrop_cli::utils::init_logging;

/// Main entry point for the BulkCrop CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;
    info!("Starting BulkCrop");

    commands::run(cli).await?;

    info!("BulkCrop completed successfully");
    Ok(())
}
