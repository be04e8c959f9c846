// Batch interactor - Sequential crop of an ordered list of jobs

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::app::crop_interactor::CropInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::ProgressReporter;

/// Interactor for the batch crop use case
///
/// Jobs run strictly one after another in input order. Per-job failures are
/// logged and recorded as skips; only cancellation and engine initialization
/// failures end the batch early.
pub struct BatchInteractor {
    cropper: Arc<CropInteractor>,
    default_container: ContainerDimensions,
    state: Mutex<BatchState>,
}

impl BatchInteractor {
    /// Create new batch interactor around a crop interactor
    pub fn new(cropper: Arc<CropInteractor>, default_container: ContainerDimensions) -> Self {
        Self {
            cropper,
            default_container,
            state: Mutex::new(BatchState::Idle),
        }
    }

    /// State of the most recent batch
    pub fn state(&self) -> BatchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Crop every job in order, reporting progress as each one completes
    pub async fn process_batch(
        &self,
        jobs: &[VideoJob],
        reporter: Option<&dyn ProgressReporter>,
        cancel: &CancelFlag,
    ) -> Result<BatchReport, BatchError> {
        if jobs.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let mut run = self.begin()?;
        cancel.reset();

        let total = jobs.len();
        let mut report = BatchReport::default();
        let mut seen_ids = HashSet::new();
        info!(jobs = total, "Starting batch");

        for (index, job) in jobs.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    completed = report.results.len(),
                    remaining = total - index,
                    "Batch cancelled"
                );
                run.outcome = BatchState::Cancelled;
                return Err(BatchError::Cancelled { report });
            }

            let file = match job.file.as_ref() {
                Some(file) if !job.id.is_empty() => file,
                _ => {
                    error!(job_id = %job.id, "Invalid video job: missing file or id");
                    report.skipped.push(skipped(job, "missing file or id"));
                    continue;
                }
            };

            if !seen_ids.insert(job.id.as_str()) {
                error!(job_id = %job.id, "Duplicate job id in batch");
                report.skipped.push(skipped(job, "duplicate job id"));
                continue;
            }

            notify(reporter, percent(index, total), &file.name, None);

            if !job.crop_settings.is_well_formed() {
                error!(job_id = %job.id, file = %file.name, "Invalid crop settings");
                report.skipped.push(skipped(
                    job,
                    &format!("invalid crop settings for video: {}", file.name),
                ));
                continue;
            }

            let container = job.container_dimensions.unwrap_or(self.default_container);
            match self
                .cropper
                .crop_video(file, &job.crop_settings, &container, cancel)
                .await
            {
                Ok(processed_video) => {
                    let completed = CroppedVideo {
                        id: job.id.clone(),
                        processed_video,
                    };
                    report.results.push(completed.clone());

                    let next_file = jobs.get(index + 1).map(|j| j.file_name()).unwrap_or("");
                    notify(reporter, percent(index + 1, total), next_file, Some(completed));
                }
                Err(e) if e.is_batch_fatal() => {
                    if e == CropError::Cancelled {
                        warn!(job_id = %job.id, "Batch cancelled during job");
                        run.outcome = BatchState::Cancelled;
                    } else {
                        error!(job_id = %job.id, error = %e, "Codec engine unavailable, aborting batch");
                        run.outcome = BatchState::Failed;
                    }
                    return Err(BatchError::from_fatal(e, report));
                }
                Err(e) => {
                    error!(job_id = %job.id, file = %file.name, error = %e, "Error processing video");
                    report.skipped.push(skipped(job, &e.to_string()));
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped_count(),
            "Batch finished"
        );
        run.outcome = BatchState::Completed;
        Ok(report)
    }

    fn begin(&self) -> Result<RunGuard<'_>, BatchError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == BatchState::Running {
            return Err(BatchError::AlreadyRunning);
        }
        *state = BatchState::Running;
        Ok(RunGuard {
            state: &self.state,
            outcome: BatchState::Failed,
        })
    }
}

/// Records the terminal state when a run ends, however it ends
struct RunGuard<'a> {
    state: &'a Mutex<BatchState>,
    outcome: BatchState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = self.outcome;
    }
}

fn percent(done: usize, total: usize) -> u8 {
    ((done as f64 / total as f64) * 100.0).round() as u8
}

fn notify(
    reporter: Option<&dyn ProgressReporter>,
    percent: u8,
    current_file: &str,
    just_completed: Option<CroppedVideo>,
) {
    if let Some(reporter) = reporter {
        reporter.report(&ProgressUpdate {
            percent,
            current_file: current_file.to_string(),
            just_completed,
        });
    }
}

fn skipped(job: &VideoJob, reason: &str) -> SkippedJob {
    SkippedJob {
        id: job.id.clone(),
        file_name: job.file_name().to_string(),
        reason: reason.to_string(),
    }
}
