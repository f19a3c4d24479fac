//! Entity Extractor
//!
//! The NER model is a black box returning aggregated entity spans. Only the
//! spans tagged with the location label survive.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::Result;
use crate::models::ExtractedEntity;

pub mod hugging_face;

pub use hugging_face::HuggingFaceClient;

/// Raw token-classification model
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Run the model once over `text`
    async fn recognize(&self, text: &str) -> Result<Vec<ExtractedEntity>>;
}

/// Finds location names in free text
#[async_trait]
pub trait LocationExtractor: Send + Sync {
    /// Location surface strings in model output order
    async fn extract_locations(&self, text: &str) -> Result<Vec<String>>;
}

/// [`LocationExtractor`] over any [`EntityRecognizer`]
pub struct NerLocationExtractor<R> {
    recognizer: R,
    location_label: String,
}

impl<R: EntityRecognizer> NerLocationExtractor<R> {
    pub fn new<S: Into<String>>(recognizer: R, location_label: S) -> Self {
        Self {
            recognizer,
            location_label: location_label.into(),
        }
    }
}

#[async_trait]
impl<R: EntityRecognizer> LocationExtractor for NerLocationExtractor<R> {
    #[instrument(level = "debug", skip(self))]
    async fn extract_locations(&self, text: &str) -> Result<Vec<String>> {
        let entities = self.recognizer.recognize(text).await?;
        debug!("Model returned {} entities", entities.len());

        Ok(entities
            .iter()
            .filter(|e| e.label == self.location_label)
            .map(|e| e.surface_text(text))
            .filter(|s| !s.is_empty())
            .collect())
    }
}
