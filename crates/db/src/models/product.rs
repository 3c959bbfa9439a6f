//! Product entity model and insert DTO for the catalog.

use serde::Serialize;
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Local storage path when the image was re-hosted; `NULL` when the
    /// image is a remote URL.
    pub image_path: Option<String>,
    pub description_is_generated: bool,
    pub image_is_generated: bool,
    /// Fixed provenance tag identifying how the record entered the catalog
    /// (e.g. `bulk_import`).
    pub source_method: String,
    /// Write-once provenance block: original row echo, generation flags,
    /// job id, and import timestamp. Never mutated after creation.
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new catalog record.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub image_path: Option<String>,
    pub description_is_generated: bool,
    pub image_is_generated: bool,
    pub source_method: String,
    pub metadata: serde_json::Value,
}
