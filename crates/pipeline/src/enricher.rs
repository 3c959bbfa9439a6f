//! Field enricher: fills a row's missing description and image via the
//! generation service, degrading to deterministic fallback content on any
//! failure.
//!
//! Enrichment never fails. Each of the two calls is independently
//! guarded, so a description failure cannot block image enrichment or
//! vice versa; the worst case is a row fully populated with fallback
//! content.

use std::sync::Arc;

use stockroom_core::fallback::{fallback_description, fallback_image_url};
use stockroom_core::import::ImportRow;
use stockroom_genai::{GenAiError, GenerationService};

/// The resolved field values for one row, with provenance flags.
#[derive(Debug, Clone)]
pub struct EnrichedFields {
    pub description: String,
    pub image_url: String,
    /// `true` when the description did not come from the source file.
    pub description_is_generated: bool,
    /// `true` when the image did not come from the source file.
    pub image_is_generated: bool,
}

/// Fills missing row fields through the generation service.
pub struct Enricher {
    service: Arc<dyn GenerationService>,
}

impl Enricher {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    /// Resolve the description and image for a row.
    ///
    /// Fields present in the file pass through unchanged. Missing fields
    /// are generated; a generation failure of either kind substitutes the
    /// corresponding fallback and is only logged.
    pub async fn enrich(&self, row: &ImportRow) -> EnrichedFields {
        let (description, description_is_generated) = match &row.description {
            Some(description) => (description.clone(), false),
            None => {
                let description = match self.service.generate_description(&row.name).await {
                    Ok(text) => {
                        tracing::debug!(
                            row_number = row.row_number,
                            name = %row.name,
                            "Generated description"
                        );
                        text
                    }
                    Err(e) => {
                        log_generation_failure("description", row, &e);
                        fallback_description(&row.name)
                    }
                };
                (description, true)
            }
        };

        let (image_url, image_is_generated) = match &row.image_url {
            Some(url) => (url.clone(), false),
            None => {
                let url = match self.service.generate_image(&row.name).await {
                    Ok(url) => {
                        tracing::debug!(
                            row_number = row.row_number,
                            name = %row.name,
                            "Generated image"
                        );
                        url
                    }
                    Err(e) => {
                        log_generation_failure("image", row, &e);
                        fallback_image_url(&row.name)
                    }
                };
                (url, true)
            }
        };

        EnrichedFields {
            description,
            image_url,
            description_is_generated,
            image_is_generated,
        }
    }
}

/// Quota exhaustion is an expected operational condition; everything else
/// is unexpected.
fn log_generation_failure(kind: &str, row: &ImportRow, error: &GenAiError) {
    match error {
        GenAiError::QuotaExceeded(_) | GenAiError::NotConfigured => {
            tracing::warn!(
                row_number = row.row_number,
                name = %row.name,
                error = %error,
                "Falling back for {kind}"
            );
        }
        _ => {
            tracing::error!(
                row_number = row.row_number,
                name = %row.name,
                error = %error,
                "Generation failed, falling back for {kind}"
            );
        }
    }
}
