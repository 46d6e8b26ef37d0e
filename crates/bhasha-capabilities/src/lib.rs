//! Capability abstraction for the hosted language services.
//!
//! Each capability is a trait so the pipeline can run against the real
//! [`BhashiniClient`] or against in-process fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;

use bhasha_core::config::Config;
use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{MediaBlob, VoiceGender};

mod asr;
pub mod client;
mod mt;
mod ocr;
mod tts;

pub use client::BhashiniClient;

/// Audio → text in the language spoken.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &MediaBlob, language: Language) -> Result<String, PipelineError>;
}

/// Image → text in the language written.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &MediaBlob, language: Language) -> Result<String, PipelineError>;
}

/// Text in `source` → text in `target`. Callers never pass `source == target`.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, PipelineError>;
}

/// Text → location of synthesized audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
    ) -> Result<String, PipelineError>;
}

/// The four capabilities a pipeline may call.
#[derive(Clone)]
pub struct Capabilities {
    pub asr: Arc<dyn SpeechRecognizer>,
    pub ocr: Arc<dyn TextExtractor>,
    pub mt: Arc<dyn Translator>,
    pub tts: Arc<dyn SpeechSynthesizer>,
}

impl Capabilities {
    /// All four capabilities served by one shared HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(BhashiniClient::new(&config.provider(), config.limits())?);
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Arc<BhashiniClient>) -> Self {
        Self {
            asr: client.clone(),
            ocr: client.clone(),
            mt: client.clone(),
            tts: client,
        }
    }
}
