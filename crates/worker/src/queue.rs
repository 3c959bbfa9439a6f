//! In-process import queue and worker loop.
//!
//! At-least-once delivery with bounded retries: each job is attempted up
//! to `max_attempts` times under a per-attempt timeout, and the terminal
//! failure hook runs once retries are exhausted, so a poller always
//! eventually observes a terminal record.
//!
//! A retried job re-runs from the beginning and may re-import rows that a
//! previous attempt already persisted; catalog records are not
//! deduplicated by row identity.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stockroom_core::import::{JOB_TIMEOUT, MAX_ATTEMPTS};
use stockroom_pipeline::{ImportJob, ImportPipeline, ProgressRecord, ProgressStore, ResultSummary};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Retry policy for the worker loop.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Wall-clock budget for one attempt.
    pub job_timeout: Duration,
    /// Attempts before the terminal failure hook runs.
    pub max_attempts: u32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            job_timeout: JOB_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

/// Handle for enqueuing import jobs and polling their state.
///
/// Jobs run sequentially on a single spawned worker task. Dropping the
/// queue (or calling [`shutdown`](Self::shutdown)) closes the channel;
/// the worker drains what was already enqueued and exits.
pub struct ImportQueue {
    tx: mpsc::UnboundedSender<ImportJob>,
    pipeline: Arc<ImportPipeline>,
    progress: Arc<dyn ProgressStore>,
    worker: JoinHandle<()>,
}

impl ImportQueue {
    /// Spawn the worker loop and return the queue handle.
    pub fn start(
        pipeline: Arc<ImportPipeline>,
        progress: Arc<dyn ProgressStore>,
        settings: QueueSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(pipeline.clone(), settings, rx));
        Self {
            tx,
            pipeline,
            progress,
            worker,
        }
    }

    /// Enqueue a bulk import and return its job id.
    ///
    /// The queued progress record is written before the job is handed to
    /// the worker, so polling the returned id always finds a record even
    /// if no processing has happened yet.
    pub async fn enqueue(&self, file_reference: PathBuf, submitted_by: Option<String>) -> String {
        let job_id = format!("bulk_upload_{}", uuid::Uuid::new_v4());
        let job = ImportJob {
            job_id: job_id.clone(),
            file_reference,
            submitted_by,
        };

        self.pipeline.mark_queued(&job).await;

        if self.tx.send(job).is_err() {
            // Worker already shut down; leave a terminal record instead of
            // a job id that polls as queued forever.
            self.pipeline
                .record_failure(&job_id, "import worker is not running")
                .await;
        }

        tracing::info!(job_id = %job_id, "Bulk import enqueued");
        job_id
    }

    /// Current progress for a job; `None` if unknown or expired.
    pub async fn poll_progress(&self, job_id: &str) -> Option<ProgressRecord> {
        self.progress.get_progress(job_id).await
    }

    /// Result summary for a job; `None` if unknown, unfinished, or expired.
    pub async fn poll_result(&self, job_id: &str) -> Option<ResultSummary> {
        self.progress.get_result(job_id).await
    }

    /// Close the queue and wait for the worker to drain.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Import worker task panicked");
        }
    }
}

/// Worker loop: one job at a time, retried under a timeout.
async fn run_worker(
    pipeline: Arc<ImportPipeline>,
    settings: QueueSettings,
    mut rx: mpsc::UnboundedReceiver<ImportJob>,
) {
    // Zero attempts would leave every job pinned at queued with no
    // terminal record; every job gets at least one run.
    let max_attempts = settings.max_attempts.max(1);

    while let Some(job) = rx.recv().await {
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            match tokio::time::timeout(settings.job_timeout, pipeline.run(&job)).await {
                Ok(Ok(summary)) => {
                    tracing::info!(
                        job_id = %job.job_id,
                        attempt,
                        success_count = summary.success_count,
                        error_count = summary.error_count,
                        "Import attempt succeeded"
                    );
                    last_error = None;
                    break;
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        job_id = %job.job_id,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Import attempt failed"
                    );
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    let message =
                        format!("timed out after {} seconds", settings.job_timeout.as_secs());
                    tracing::warn!(
                        job_id = %job.job_id,
                        attempt,
                        max_attempts,
                        "Import attempt {message}"
                    );
                    last_error = Some(message);
                }
            }
        }

        if let Some(message) = last_error {
            pipeline.record_failure(&job.job_id, &message).await;
        }
    }
}
