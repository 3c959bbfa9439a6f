//! Batch orchestrator: drives parsing, enrichment, and persistence across
//! all rows of one import job.
//!
//! State machine: queued → counting → reading → batch-processing →
//! finalizing → {completed | completed_with_errors | failed}. Rows are
//! processed sequentially in fixed-size batches with a pacing pause
//! between batches. A single row failure never aborts the job; only
//! fatal parse errors unwind out of [`ImportPipeline::run`], where the
//! surrounding task runner's retry policy takes over.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stockroom_core::import::{
    batch_count, row_error_message, row_progress, JobStatus, DEFAULT_BATCH_PAUSE_MS,
    DEFAULT_BATCH_SIZE, MSG_NO_PRODUCTS,
};
use stockroom_genai::GenerationService;

use crate::enricher::Enricher;
use crate::parser::{parse_rows, ParseError};
use crate::progress::{ProgressStore, ResultSummary};
use crate::writer::{CatalogStore, RecordWriter};

/// One bulk-import run. Owned exclusively by the orchestrator while it
/// executes; nothing about the job persists beyond the progress store.
#[derive(Debug, Clone)]
pub struct ImportJob {
    /// Opaque unique id, created at enqueue time, never reused.
    pub job_id: String,
    /// Locator for the source file.
    pub file_reference: PathBuf,
    /// Identity of the initiating actor, when known.
    pub submitted_by: Option<String>,
}

/// Tunables for batch processing.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Rows per batch.
    pub batch_size: usize,
    /// Pause between batches, throttling the generation service and the
    /// database.
    pub batch_pause: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
        }
    }
}

/// The import pipeline with its three seams injected.
pub struct ImportPipeline {
    enricher: Enricher,
    writer: RecordWriter,
    progress: Arc<dyn ProgressStore>,
    config: ImportConfig,
}

impl ImportPipeline {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        store: Arc<dyn CatalogStore>,
        progress: Arc<dyn ProgressStore>,
        config: ImportConfig,
    ) -> Self {
        Self {
            enricher: Enricher::new(generation),
            writer: RecordWriter::new(store),
            progress,
            config,
        }
    }

    /// Write the initial queued record for a job.
    ///
    /// Called synchronously at enqueue time, before the task starts
    /// executing, so a poll that arrives immediately after enqueue always
    /// finds a record.
    pub async fn mark_queued(&self, job: &ImportJob) {
        self.progress
            .set_progress(&job.job_id, 0, "Import queued", JobStatus::Queued)
            .await;
    }

    /// Execute one import attempt to completion.
    ///
    /// Returns the job's result summary on any terminal outcome the
    /// orchestrator handles itself. Only fatal file/header errors
    /// propagate as `Err`; the caller (the task runner) is responsible
    /// for retries and for recording the failure once retries are
    /// exhausted via [`record_failure`](Self::record_failure).
    pub async fn run(&self, job: &ImportJob) -> Result<ResultSummary, ParseError> {
        tracing::info!(
            job_id = %job.job_id,
            file = %job.file_reference.display(),
            submitted_by = job.submitted_by.as_deref().unwrap_or("unknown"),
            "Starting bulk import"
        );

        self.progress
            .set_progress(&job.job_id, 5, "Reading import file", JobStatus::Processing)
            .await;

        // counting + reading; fatal errors abort the whole job here.
        let parsed = parse_rows(&job.file_reference)?;
        let total = parsed.total_rows;

        if parsed.rows.is_empty() {
            tracing::info!(job_id = %job.job_id, "Import file contained no products");
            let summary = ResultSummary::new(0, 0, Vec::new(), JobStatus::Completed);
            self.finalize(&job.job_id, summary.clone(), MSG_NO_PRODUCTS.to_string())
                .await;
            return Ok(summary);
        }

        self.progress
            .set_progress(
                &job.job_id,
                row_progress(0, total),
                &format!("Processing {total} products"),
                JobStatus::Processing,
            )
            .await;

        let mut success_count = 0usize;
        let mut errors: Vec<String> = Vec::new();
        let mut rows_done = 0usize;

        // chunks() panics on a zero size; a misconfigured batch size
        // degrades to one row per batch.
        let batch_size = self.config.batch_size.max(1);
        let total_batches = batch_count(total, batch_size);

        for (batch_index, batch) in parsed.rows.chunks(batch_size).enumerate() {
            for row in batch {
                let fields = self.enricher.enrich(row).await;
                match self.writer.write(row, &fields, &job.job_id).await {
                    Ok(product) => {
                        tracing::debug!(
                            job_id = %job.job_id,
                            row_number = row.row_number,
                            product_id = product.id,
                            "Imported product"
                        );
                        success_count += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = %job.job_id,
                            row_number = row.row_number,
                            name = %row.name,
                            error = %e,
                            "Row failed, continuing"
                        );
                        errors.push(row_error_message(row.row_number, &row.name, &e.to_string()));
                    }
                }

                rows_done += 1;
                self.progress
                    .set_progress(
                        &job.job_id,
                        row_progress(rows_done, total),
                        &format!("Processed {rows_done} of {total} products"),
                        JobStatus::Processing,
                    )
                    .await;
            }

            if batch_index + 1 < total_batches {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        let status = if errors.is_empty() {
            JobStatus::Completed
        } else {
            JobStatus::CompletedWithErrors
        };
        let summary = ResultSummary::new(success_count, total, errors, status);

        tracing::info!(
            job_id = %job.job_id,
            success_count,
            error_count = summary.error_count,
            total_rows = total,
            status = %status,
            "Bulk import finished"
        );

        let message = format!("Import complete: {success_count} products imported");
        self.finalize(&job.job_id, summary.clone(), message).await;
        Ok(summary)
    }

    /// Record the terminal failed state for a job.
    ///
    /// Used for any error that unwinds past [`run`](Self::run), including
    /// a timeout, once the task runner has exhausted its retries. After
    /// this a poller always observes a terminal record.
    pub async fn record_failure(&self, job_id: &str, message: &str) {
        tracing::error!(job_id = %job_id, error = %message, "Bulk import failed permanently");

        let summary =
            ResultSummary::new(0, 0, vec![format!("Import failed: {message}")], JobStatus::Failed);
        self.progress.set_result(job_id, summary).await;
        self.progress
            .set_progress(
                job_id,
                100,
                &format!("Import failed: {message}"),
                JobStatus::Failed,
            )
            .await;
    }

    /// Write the result summary, then the final 100% progress record.
    async fn finalize(&self, job_id: &str, summary: ResultSummary, message: String) {
        let status = summary.status;
        self.progress.set_result(job_id, summary).await;
        self.progress
            .set_progress(job_id, 100, &message, status)
            .await;
    }
}
