use std::time::Duration;

use stockroom_core::import::{
    DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE, JOB_TIMEOUT, MAX_ATTEMPTS,
};

/// Worker configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Rows per import batch.
    pub batch_size: usize,
    /// Pause between batches.
    pub batch_pause: Duration,
    /// Wall-clock budget for a single import attempt.
    pub job_timeout: Duration,
    /// Attempts before a job is failed permanently.
    pub max_attempts: u32,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                     |
    /// |--------------------------|---------------------------------------------|
    /// | `DATABASE_URL`           | `postgres://localhost/stockroom`            |
    /// | `IMPORT_BATCH_SIZE`      | `5`                                         |
    /// | `IMPORT_BATCH_PAUSE_MS`  | `500`                                       |
    /// | `IMPORT_JOB_TIMEOUT_SECS`| `300`                                       |
    /// | `IMPORT_MAX_ATTEMPTS`    | `3`                                         |
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/stockroom".into());

        let batch_size: usize = std::env::var("IMPORT_BATCH_SIZE")
            .unwrap_or_else(|_| DEFAULT_BATCH_SIZE.to_string())
            .parse()
            .expect("IMPORT_BATCH_SIZE must be a valid usize");

        let batch_pause_ms: u64 = std::env::var("IMPORT_BATCH_PAUSE_MS")
            .unwrap_or_else(|_| DEFAULT_BATCH_PAUSE_MS.to_string())
            .parse()
            .expect("IMPORT_BATCH_PAUSE_MS must be a valid u64");

        let job_timeout_secs: u64 = std::env::var("IMPORT_JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| JOB_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("IMPORT_JOB_TIMEOUT_SECS must be a valid u64");

        let max_attempts: u32 = std::env::var("IMPORT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| MAX_ATTEMPTS.to_string())
            .parse()
            .expect("IMPORT_MAX_ATTEMPTS must be a valid u32");

        Self {
            database_url,
            batch_size,
            batch_pause: Duration::from_millis(batch_pause_ms),
            job_timeout: Duration::from_secs(job_timeout_secs),
            max_attempts,
        }
    }
}
