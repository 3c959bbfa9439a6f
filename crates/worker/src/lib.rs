//! Task lifecycle for bulk-import jobs: an in-process at-least-once queue
//! with a bounded retry policy, a per-attempt timeout, and a terminal
//! failure hook.

pub mod config;
pub mod queue;

pub use config::WorkerConfig;
pub use queue::{ImportQueue, QueueSettings};
