//! Speech synthesis: text in, location of the generated audio out.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{Operation, VoiceGender};
use bhasha_core::validation;

use crate::SpeechSynthesizer;
use crate::client::BhashiniClient;

#[async_trait]
impl SpeechSynthesizer for BhashiniClient {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
    ) -> Result<String, PipelineError> {
        validation::ensure_tts_text(text, &self.limits)?;
        let target = self.language_target(Operation::Synthesize, language)?;

        let url = self
            .post_json(
                Operation::Synthesize,
                target,
                &json!({ "text": text, "gender": gender.as_str() }),
                "s3_url",
            )
            .await?;

        info!(
            language = language.code(),
            gender = gender.as_str(),
            "Speech synthesized"
        );
        Ok(url)
    }
}
