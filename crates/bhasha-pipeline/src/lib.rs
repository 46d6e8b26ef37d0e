//! Pipeline planning and execution.
//!
//! A request names an input modality, an output modality and a language pair.
//! The [`planner`] turns that into an ordered operation list and the
//! [`executor`] folds the payload through the matching capabilities.

use serde::Serialize;
use serde::ser::SerializeMap;

use bhasha_core::language::Language;
use bhasha_core::types::{InputModality, Operation, OutputModality, Payload, VoiceGender};

pub mod describe;
pub mod executor;
pub mod gate;
pub mod planner;

pub use describe::{OperationResponse, describe};
pub use executor::{PipelineExecutor, StepState};
pub use planner::{PipelinePlan, plan, plan_for_codes};

/// One pipeline invocation, with language codes still unvalidated.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: Payload,
    pub source_language: String,
    pub target_language: String,
    pub output: OutputModality,
    pub gender: VoiceGender,
}

impl PipelineRequest {
    pub fn new(
        input: Payload,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        output: OutputModality,
    ) -> Self {
        Self {
            input,
            source_language: source_language.into(),
            target_language: target_language.into(),
            output,
            gender: VoiceGender::default(),
        }
    }

    pub fn with_gender(mut self, gender: VoiceGender) -> Self {
        self.gender = gender;
        self
    }
}

/// Artifacts recorded per step, in execution order.
///
/// Serializes as a JSON object keyed by each operation's result key
/// (`asr_text`, `ocr_text`, `translated_text`, `tts_audio_url`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateResults {
    entries: Vec<(Operation, String)>,
}

impl IntermediateResults {
    /// Return a copy with one more entry appended.
    pub fn with(&self, operation: Operation, value: String) -> Self {
        let mut entries = self.entries.clone();
        entries.push((operation, value));
        Self { entries }
    }

    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.entries
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(op, _)| op.result_key()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for IntermediateResults {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (op, value) in &self.entries {
            map.serialize_entry(op.result_key(), value)?;
        }
        map.end()
    }
}

/// Terminal snapshot of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub final_output: String,
    pub source_language: Language,
    pub target_language: Language,
    /// Language of `final_output`: the target if Translate ran, else the source.
    pub final_language: Language,
    pub input_type: InputModality,
    pub output_type: OutputModality,
    pub operations_performed: Vec<Operation>,
    pub intermediate_results: IntermediateResults,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intermediate_results_keep_insertion_order() {
        let results = IntermediateResults::default()
            .with(Operation::Recognize, "namaste".into())
            .with(Operation::Translate, "hello".into())
            .with(Operation::Synthesize, "https://a/b.wav".into());

        assert_eq!(results.keys(), ["asr_text", "translated_text", "tts_audio_url"]);
        assert_eq!(results.get(Operation::Translate), Some("hello"));
        assert_eq!(results.get(Operation::Extract), None);

        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(
            json,
            r#"{"asr_text":"namaste","translated_text":"hello","tts_audio_url":"https://a/b.wav"}"#
        );
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let base = IntermediateResults::default().with(Operation::Extract, "sign".into());
        let next = base.with(Operation::Translate, "board".into());
        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
    }
}
