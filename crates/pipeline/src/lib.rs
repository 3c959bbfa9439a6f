//! The asynchronous bulk-import pipeline: parse a delimited product file,
//! enrich missing fields through the generation service, persist catalog
//! records, and report polled progress per job.
//!
//! The orchestrator in [`orchestrator`] drives the whole flow; the other
//! modules are its collaborators, each behind a seam that accepts test
//! doubles.

pub mod enricher;
pub mod orchestrator;
pub mod parser;
pub mod progress;
pub mod writer;

pub use enricher::{EnrichedFields, Enricher};
pub use orchestrator::{ImportConfig, ImportJob, ImportPipeline};
pub use parser::{parse_rows, ParseError, ParsedFile};
pub use progress::{MemoryProgressStore, ProgressRecord, ProgressStore, ResultSummary};
pub use writer::{CatalogStore, PgCatalogStore, RecordWriter, StoreError};
