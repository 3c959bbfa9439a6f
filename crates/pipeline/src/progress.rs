//! Progress store: a keyed side-channel recording each job's live
//! progress and, on completion, its result summary.
//!
//! Progress is advisory. There is no transactional coupling to catalog
//! writes, and the store is last-write-wins; monotonicity of the
//! percentage is the orchestrator's responsibility (it is the sole writer
//! for a job's key). Entries expire after a retention window so
//! abandoned job ids do not accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stockroom_core::import::{JobStatus, RESULT_RETENTION};
use stockroom_core::types::Timestamp;
use tokio::sync::RwLock;

/// Transient status of one job, overwritten in place on every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// 0-100; non-decreasing over the life of one job.
    pub percentage: u8,
    /// Human-readable description of the current step.
    pub message: String,
    pub status: JobStatus,
    /// Time of the last update.
    pub timestamp: Timestamp,
}

/// Terminal record for one job, written once at completion or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub success_count: usize,
    /// Always equals `errors.len()`; guaranteed by [`ResultSummary::new`].
    pub error_count: usize,
    pub total_rows: usize,
    /// Ordered human-readable failure descriptions, one per failed row.
    pub errors: Vec<String>,
    pub completed_at: Timestamp,
    pub status: JobStatus,
}

impl ResultSummary {
    pub fn new(
        success_count: usize,
        total_rows: usize,
        errors: Vec<String>,
        status: JobStatus,
    ) -> Self {
        Self {
            success_count,
            error_count: errors.len(),
            total_rows,
            errors,
            completed_at: Utc::now(),
            status,
        }
    }
}

/// Keyed put/get side-channel polled by callers, with bounded retention.
#[async_trait::async_trait]
pub trait ProgressStore: Send + Sync {
    async fn set_progress(&self, job_id: &str, percentage: u8, message: &str, status: JobStatus);

    /// `None` when the job id is unknown or its record has expired.
    async fn get_progress(&self, job_id: &str) -> Option<ProgressRecord>;

    async fn set_result(&self, job_id: &str, summary: ResultSummary);

    /// `None` when the job id is unknown or its record has expired.
    async fn get_result(&self, job_id: &str) -> Option<ResultSummary>;
}

struct Entry<T> {
    value: T,
    expires_at: Timestamp,
}

impl<T: Clone> Entry<T> {
    fn new(value: T, retention: Duration) -> Self {
        Self {
            value,
            expires_at: Utc::now()
                + chrono::Duration::from_std(retention)
                    .unwrap_or_else(|_| chrono::Duration::hours(24)),
        }
    }

    fn live(&self) -> Option<T> {
        (self.expires_at > Utc::now()).then(|| self.value.clone())
    }
}

/// In-memory [`ProgressStore`] shared across all concurrently running
/// jobs. Safe without per-key locking because no two jobs share a key
/// and each job has a single sequential writer.
#[derive(Clone)]
pub struct MemoryProgressStore {
    retention: Duration,
    progress: Arc<RwLock<HashMap<String, Entry<ProgressRecord>>>>,
    results: Arc<RwLock<HashMap<String, Entry<ResultSummary>>>>,
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::with_retention(RESULT_RETENTION)
    }
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a custom retention window. Entries expire `retention`
    /// after their last write.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            retention,
            progress: Arc::default(),
            results: Arc::default(),
        }
    }

    /// Drop every expired entry. Reads already ignore expired entries;
    /// this reclaims the memory.
    pub async fn evict_expired(&self) {
        let now = Utc::now();
        self.progress
            .write()
            .await
            .retain(|_, e| e.expires_at > now);
        self.results.write().await.retain(|_, e| e.expires_at > now);
    }
}

#[async_trait::async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn set_progress(&self, job_id: &str, percentage: u8, message: &str, status: JobStatus) {
        let record = ProgressRecord {
            percentage,
            message: message.to_string(),
            status,
            timestamp: Utc::now(),
        };
        self.progress
            .write()
            .await
            .insert(job_id.to_string(), Entry::new(record, self.retention));
    }

    async fn get_progress(&self, job_id: &str) -> Option<ProgressRecord> {
        self.progress.read().await.get(job_id).and_then(Entry::live)
    }

    async fn set_result(&self, job_id: &str, summary: ResultSummary) {
        self.results
            .write()
            .await
            .insert(job_id.to_string(), Entry::new(summary, self.retention));
    }

    async fn get_result(&self, job_id: &str) -> Option<ResultSummary> {
        self.results.read().await.get(job_id).and_then(Entry::live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_job_is_absent() {
        let store = MemoryProgressStore::new();
        assert!(store.get_progress("missing").await.is_none());
        assert!(store.get_result("missing").await.is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryProgressStore::new();
        store
            .set_progress("job-1", 10, "Reading file", JobStatus::Processing)
            .await;
        store
            .set_progress("job-1", 50, "Halfway", JobStatus::Processing)
            .await;

        let record = store.get_progress("job-1").await.unwrap();
        assert_eq!(record.percentage, 50);
        assert_eq!(record.message, "Halfway");
    }

    #[tokio::test]
    async fn jobs_do_not_interfere() {
        let store = MemoryProgressStore::new();
        store
            .set_progress("job-a", 10, "a", JobStatus::Processing)
            .await;
        store
            .set_progress("job-b", 90, "b", JobStatus::Processing)
            .await;

        assert_eq!(store.get_progress("job-a").await.unwrap().percentage, 10);
        assert_eq!(store.get_progress("job-b").await.unwrap().percentage, 90);
    }

    #[tokio::test]
    async fn result_round_trip() {
        let store = MemoryProgressStore::new();
        let summary = ResultSummary::new(
            3,
            4,
            vec!["Row 2 (Lamp): boom".into()],
            JobStatus::CompletedWithErrors,
        );
        store.set_result("job-1", summary).await;

        let fetched = store.get_result("job-1").await.unwrap();
        assert_eq!(fetched.success_count, 3);
        assert_eq!(fetched.error_count, 1);
        assert_eq!(fetched.error_count, fetched.errors.len());
        assert_eq!(fetched.total_rows, 4);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = MemoryProgressStore::with_retention(Duration::ZERO);
        store
            .set_progress("job-1", 10, "Reading file", JobStatus::Processing)
            .await;
        store
            .set_result("job-1", ResultSummary::new(1, 1, Vec::new(), JobStatus::Completed))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(store.get_progress("job-1").await.is_none());
        assert!(store.get_result("job-1").await.is_none());
    }

    #[tokio::test]
    async fn evict_expired_reclaims_entries() {
        let store = MemoryProgressStore::with_retention(Duration::ZERO);
        store
            .set_progress("job-1", 10, "Reading file", JobStatus::Processing)
            .await;
        store
            .set_result("job-1", ResultSummary::new(1, 1, Vec::new(), JobStatus::Completed))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        store.evict_expired().await;

        assert!(store.progress.read().await.is_empty());
        assert!(store.results.read().await.is_empty());
    }

    #[tokio::test]
    async fn live_entries_survive_eviction() {
        let store = MemoryProgressStore::new();
        store
            .set_progress("job-1", 10, "Reading file", JobStatus::Processing)
            .await;

        store.evict_expired().await;

        assert_eq!(store.get_progress("job-1").await.unwrap().percentage, 10);
    }

    #[test]
    fn summary_error_count_matches_errors() {
        let summary = ResultSummary::new(0, 0, vec!["a".into(), "b".into()], JobStatus::Failed);
        assert_eq!(summary.error_count, 2);
    }
}
