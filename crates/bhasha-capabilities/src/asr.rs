//! Speech recognition: WAV audio in, same-language text out.

use async_trait::async_trait;
use tracing::info;

use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{MediaBlob, Operation};
use bhasha_core::validation;

use crate::SpeechRecognizer;
use crate::client::BhashiniClient;

#[async_trait]
impl SpeechRecognizer for BhashiniClient {
    async fn recognize(&self, audio: &MediaBlob, language: Language) -> Result<String, PipelineError> {
        let seconds = validation::ensure_audio(audio, &self.limits)?;
        let target = self.language_target(Operation::Recognize, language)?;

        let text = self
            .post_file(Operation::Recognize, target, "audio_file", audio, "recognized_text")
            .await?;

        info!(
            language = language.code(),
            seconds,
            chars = text.len(),
            "Audio transcribed"
        );
        Ok(text)
    }
}
