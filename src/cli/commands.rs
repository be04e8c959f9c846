//! Command implementations

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::adapters::job_manifest::{self, derive_job_id};
use crate::adapters::{AppConfig, LocalFsAdapter};
use crate::app::{AppContainer, DefaultAppContainer, ValidationReport};
use crate::cli::args::{CropArgs, ProbeArgs, ValidateArgs};
use crate::cli::{Cli, Commands};
use crate::config_initialization::{initialize_configuration_hierarchy, ConfigSource};
use crate::domain::errors::BatchError;
use crate::domain::model::*;
use crate::error::{BulkCropError, BulkCropResult};
use crate::ports::ProgressReporter;

/// Resolve configuration, wire the application and run the requested command
pub async fn run(cli: Cli) -> Result<()> {
    let source = ConfigSource::from_cli(cli.config.as_deref());
    let config = initialize_configuration_hierarchy(&source, &cli.config_overrides())
        .context("Failed to load configuration")?;
    let container = DefaultAppContainer::new(&config);

    match &cli.command {
        Commands::Crop(args) => {
            info!("Executing crop command");
            let cancel = CancelFlag::new();
            watch_ctrl_c(cancel.clone());
            let summary = crop(&container, &config, args, &cancel).await?;
            summary.into_result()
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            probe(&container, args).await
        }
        Commands::Validate(args) => {
            info!("Executing validate command");
            validate(&container, args).await
        }
    }
}

/// Cancel the batch on Ctrl-C; a running encoder gets the signal too
fn watch_ctrl_c(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current step");
            cancel.cancel();
        }
    });
}

/// Outcome of a crop command
#[derive(Debug, Clone, Serialize)]
pub struct CropSummary {
    pub succeeded: usize,
    pub skipped: Vec<SkippedJob>,
    pub outputs: Vec<PathBuf>,
    pub write_failures: Vec<String>,
    pub cancelled: bool,
}

impl CropSummary {
    fn from_report(report: &BatchReport, written: WrittenOutputs, cancelled: bool) -> Self {
        Self {
            succeeded: report.succeeded(),
            skipped: report.skipped.clone(),
            outputs: written.paths,
            write_failures: written.failures,
            cancelled,
        }
    }

    /// Non-zero exit for cancelled batches and unwritable outputs
    pub fn into_result(self) -> Result<()> {
        if self.cancelled {
            anyhow::bail!("Batch cancelled after {} videos", self.succeeded);
        }
        if !self.write_failures.is_empty() {
            anyhow::bail!("{} cropped videos could not be written", self.write_failures.len());
        }
        Ok(())
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            let text = serde_json::to_string_pretty(self)
                .context("Failed to serialize crop summary to JSON")?;
            println!("{}", text);
            return Ok(());
        }

        println!(
            "{} succeeded, {} skipped due to errors",
            self.succeeded,
            self.skipped.len()
        );
        for path in &self.outputs {
            println!("  wrote {}", path.display());
        }
        for skip in &self.skipped {
            println!("  skipped {} ({}): {}", skip.id, skip.file_name, skip.reason);
        }
        for failure in &self.write_failures {
            println!("  failed to write {}", failure);
        }
        if self.cancelled {
            println!("Batch cancelled");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct WrittenOutputs {
    paths: Vec<PathBuf>,
    failures: Vec<String>,
}

/// Execute the crop command
pub async fn crop(
    container: &dyn AppContainer,
    config: &AppConfig,
    args: &CropArgs,
    cancel: &CancelFlag,
) -> Result<CropSummary> {
    info!("Starting crop operation");

    let jobs = collect_jobs(args).await?;
    let jobs = select_croppable(jobs, config.max_video_count)?;

    let fs = LocalFsAdapter::new(&config.output_dir);
    let file_names: HashMap<&str, &str> = jobs
        .iter()
        .rev()
        .map(|job| (job.id.as_str(), job.file_name()))
        .collect();
    let written = Mutex::new(WrittenOutputs::default());

    // Outputs are persisted as each job completes
    let reporter = |update: &ProgressUpdate| {
        info!(percent = update.percent, current_file = %update.current_file, "Progress");
        let Some(done) = &update.just_completed else {
            return;
        };
        let source_name = file_names.get(done.id.as_str()).copied().unwrap_or(done.id.as_str());
        let mut written = written.lock().unwrap_or_else(|e| e.into_inner());
        match fs.write_output(source_name, &done.processed_video) {
            Ok(path) => written.paths.push(path),
            Err(e) => {
                error!(job_id = %done.id, error = %e, "Failed to write output");
                written.failures.push(format!("{}: {}", done.id, e));
            }
        }
    };

    let batch = container.batch_interactor();
    let outcome = batch
        .process_batch(&jobs, Some(&reporter as &dyn ProgressReporter), cancel)
        .await;
    let written = written.into_inner().unwrap_or_else(|e| e.into_inner());

    let summary = match outcome {
        Ok(report) => CropSummary::from_report(&report, written, false),
        Err(BatchError::Cancelled { report }) => CropSummary::from_report(&report, written, true),
        Err(e) => return Err(BulkCropError::from(e)).context("Batch failed"),
    };

    summary.print(args.json)?;
    info!(
        succeeded = summary.succeeded,
        skipped = summary.skipped.len(),
        "Crop operation finished"
    );
    Ok(summary)
}

/// Build the batch from a manifest, or from files and a shared crop
pub async fn collect_jobs(args: &CropArgs) -> BulkCropResult<Vec<VideoJob>> {
    if let Some(manifest) = &args.manifest {
        return job_manifest::load_jobs(manifest).await;
    }

    let crop = args.crop.ok_or_else(|| BulkCropError::Config {
        message: "--crop is required unless a manifest is given".to_string(),
    })?;

    let mut paths = args.inputs.clone();
    if let Some(dir) = &args.dir {
        paths.extend(LocalFsAdapter::discover_videos(dir)?);
    }

    let mut jobs = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let id = derive_job_id(index, path);
        let file = match LocalFsAdapter::read_video(path).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(job_id = %id, path = %path.display(), error = %e, "Could not read video");
                None
            }
        };
        // Container size comes from configuration, which `--container` overrides
        jobs.push(VideoJob {
            id,
            file,
            crop_settings: crop,
            container_dimensions: None,
        });
    }
    Ok(jobs)
}

/// Enforce the batch size limit and drop jobs without a drawn crop
pub fn select_croppable(jobs: Vec<VideoJob>, max_video_count: usize) -> BulkCropResult<Vec<VideoJob>> {
    if jobs.len() > max_video_count {
        return Err(BulkCropError::TooManyVideos {
            count: jobs.len(),
            max: max_video_count,
        });
    }

    let total = jobs.len();
    let croppable: Vec<VideoJob> = jobs
        .into_iter()
        .filter(|job| {
            let keep = job.crop_settings.has_area();
            if !keep {
                warn!(job_id = %job.id, file = %job.file_name(), "No crop drawn, leaving video out");
            }
            keep
        })
        .collect();

    if croppable.is_empty() {
        return Err(BulkCropError::NoCroppableVideos);
    }
    info!(selected = croppable.len(), total, "Selected videos with crop settings");
    Ok(croppable)
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    file: String,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<f64>,
    error: Option<String>,
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: &ProbeArgs) -> Result<()> {
    let prober = container.prober();
    let mut reports = Vec::with_capacity(args.inputs.len());

    for path in &args.inputs {
        let result = match LocalFsAdapter::read_video(path).await {
            Ok(file) => prober.probe(&file).await.map_err(BulkCropError::from),
            Err(e) => Err(e),
        };
        reports.push(match result {
            Ok(meta) => ProbeReport {
                file: path.display().to_string(),
                width: Some(meta.dimensions.width),
                height: Some(meta.dimensions.height),
                duration: meta.duration.map(|d| d.as_secs_f64()),
                error: None,
            },
            Err(e) => {
                error!(path = %path.display(), error = %e, "Probe failed");
                ProbeReport {
                    file: path.display().to_string(),
                    width: None,
                    height: None,
                    duration: None,
                    error: Some(e.to_string()),
                }
            }
        });
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize probe results to JSON")?;
        println!("{}", json);
    } else {
        for report in &reports {
            match (&report.error, report.width, report.height) {
                (None, Some(w), Some(h)) => println!(
                    "{}: {}x{}, {}",
                    report.file,
                    w,
                    h,
                    report
                        .duration
                        .map(|d| format!("{:.2}s", d))
                        .unwrap_or_else(|| "unknown duration".to_string())
                ),
                (error, _, _) => println!(
                    "{}: error: {}",
                    report.file,
                    error.as_deref().unwrap_or("unknown")
                ),
            }
        }
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} videos could not be probed", failed, reports.len());
    }
    Ok(())
}

/// Execute the validate command
pub async fn validate(container: &dyn AppContainer, args: &ValidateArgs) -> Result<()> {
    let validator = container.upload_validator();
    let mut reports: Vec<ValidationReport> = Vec::with_capacity(args.inputs.len());

    for path in &args.inputs {
        let report = match LocalFsAdapter::read_video(path).await {
            Ok(file) => validator.validate(&file).await,
            Err(e) => ValidationReport {
                file_name: display_name(path),
                valid: false,
                errors: vec![e.to_string()],
                duration: None,
            },
        };
        reports.push(report);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize validation results to JSON")?;
        println!("{}", json);
    } else {
        for report in &reports {
            if report.valid {
                println!("✓ {}", report.file_name);
            } else {
                println!("✗ {}", report.file_name);
                for message in &report.errors {
                    println!("    {}", message);
                }
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} videos failed validation", invalid, reports.len());
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
