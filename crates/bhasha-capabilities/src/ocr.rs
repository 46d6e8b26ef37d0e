//! Text extraction from JPG/PNG images.

use async_trait::async_trait;
use tracing::info;

use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{MediaBlob, Operation};
use bhasha_core::validation;

use crate::TextExtractor;
use crate::client::BhashiniClient;

#[async_trait]
impl TextExtractor for BhashiniClient {
    async fn extract(&self, image: &MediaBlob, language: Language) -> Result<String, PipelineError> {
        validation::ensure_image(image, &self.limits)?;
        let target = self.language_target(Operation::Extract, language)?;

        let text = self
            .post_file(Operation::Extract, target, "file", image, "decoded_text")
            .await?;

        info!(language = language.code(), chars = text.len(), "Image text extracted");
        Ok(text)
    }
}
