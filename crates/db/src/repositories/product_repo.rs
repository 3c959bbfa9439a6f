//! Repository for the `products` table.
//!
//! Bulk-imported records are append-only: each successfully processed row
//! produces one independent insert, and the metadata block is never
//! updated afterwards.

use sqlx::PgPool;

use crate::models::product::{NewProduct, Product};

/// Column list for `products` queries.
const COLUMNS: &str = "\
    id, name, description, image_url, image_path, \
    description_is_generated, image_is_generated, \
    source_method, metadata, created_at, updated_at";

/// Provides access to catalog product records.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert one catalog record and return the persisted row.
    pub async fn create(pool: &PgPool, input: &NewProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                 (name, description, image_url, image_path, \
                  description_is_generated, image_is_generated, \
                  source_method, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.image_path)
            .bind(input.description_is_generated)
            .bind(input.image_is_generated)
            .bind(&input.source_method)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }
}
