//! Record writer: persists one enriched row as a catalog record with a
//! write-once provenance block.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use stockroom_core::import::{ImportRow, SOURCE_METHOD_BULK_IMPORT};
use stockroom_db::models::{NewProduct, Product};
use stockroom_db::repositories::ProductRepo;

use crate::enricher::EnrichedFields;

/// Persistence failure for one row. Caught by the orchestrator and
/// recorded as a per-row error, never fatal to the job.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Catalog storage seam. Create-only from the pipeline's perspective:
/// each successful row yields one independent new record.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;
}

/// Production store backed by PostgreSQL via [`ProductRepo`].
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        ProductRepo::create(&self.pool, &product)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }
}

/// Builds and persists catalog records from enriched rows.
pub struct RecordWriter {
    store: Arc<dyn CatalogStore>,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Persist one enriched row as a catalog record, attaching the
    /// provenance metadata block.
    pub async fn write(
        &self,
        row: &ImportRow,
        fields: &EnrichedFields,
        job_id: &str,
    ) -> Result<Product, StoreError> {
        self.store.create(build_record(row, fields, job_id)).await
    }
}

/// Assemble the insert DTO for one row.
///
/// `image_path` stays `None`: the importer stores image URLs as-is, and
/// re-hosting remote images is the storage layer's concern, not this
/// pipeline's.
pub fn build_record(row: &ImportRow, fields: &EnrichedFields, job_id: &str) -> NewProduct {
    NewProduct {
        name: row.name.clone(),
        description: fields.description.clone(),
        image_url: fields.image_url.clone(),
        image_path: None,
        description_is_generated: fields.description_is_generated,
        image_is_generated: fields.image_is_generated,
        source_method: SOURCE_METHOD_BULK_IMPORT.to_string(),
        metadata: json!({
            "original_row": row,
            "generated": {
                "description": fields.description_is_generated,
                "image": fields.image_is_generated,
            },
            "job_id": job_id,
            "imported_at": Utc::now(),
        }),
    }
}
