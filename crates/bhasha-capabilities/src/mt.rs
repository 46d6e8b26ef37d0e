//! Machine translation between an ordered language pair.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use bhasha_core::config::EndpointsConfig;
use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::Operation;
use bhasha_core::validation;

use crate::Translator;
use crate::client::BhashiniClient;

#[async_trait]
impl Translator for BhashiniClient {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, PipelineError> {
        validation::ensure_mt_text(text, &self.limits)?;

        let endpoint = self.endpoints.translation_endpoint(source, target);
        let target_ep = self.target(
            Operation::Translate,
            EndpointsConfig::pair_key(source, target),
            endpoint,
        )?;

        let translated = self
            .post_json(
                Operation::Translate,
                target_ep,
                &json!({ "input_text": text }),
                "output_text",
            )
            .await?;

        info!(
            source = source.code(),
            target = target.code(),
            chars = translated.len(),
            "Text translated"
        );
        Ok(translated)
    }
}
