//! Human-readable summaries and the response shape returned to callers.

use serde::Serialize;

use bhasha_core::language::Language;
use bhasha_core::types::{InputModality, Operation, OutputModality};

use crate::planner;
use crate::{IntermediateResults, PipelineResult};

/// One-line summary of what a run did.
pub fn describe(result: &PipelineResult) -> String {
    summary(
        result.input_type,
        result.output_type,
        result.source_language,
        result.target_language,
    )
}

fn summary(
    input: InputModality,
    output: OutputModality,
    source: Language,
    target: Language,
) -> String {
    let src = source.display_name();
    let tgt = target.display_name();
    let same = source == target;

    match (input, output) {
        (InputModality::Text, OutputModality::Text) if same => {
            format!("Text returned as-is (same language: {src})")
        }
        (InputModality::Text, OutputModality::Text) => format!("Translated from {src} to {tgt}"),
        (InputModality::Text, OutputModality::Audio) => {
            format!("Converted {src} text to {tgt} audio")
        }
        (InputModality::Audio, OutputModality::Text) if same => {
            format!("Transcribed {src} audio to text")
        }
        (InputModality::Audio, OutputModality::Text) => {
            format!("Transcribed and translated {src} audio to {tgt} text")
        }
        (InputModality::Audio, OutputModality::Audio) => {
            format!("Converted {src} audio to {tgt} audio")
        }
        (InputModality::Image, OutputModality::Text) if same => {
            format!("Extracted {src} text from image")
        }
        (InputModality::Image, OutputModality::Text) => {
            format!("Extracted {src} text from image and translated to {tgt}")
        }
        (InputModality::Image, OutputModality::Audio) => {
            format!("Extracted {src} text from image and converted to {tgt} audio")
        }
    }
}

/// Body returned by the unified endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse {
    pub success: bool,
    pub final_output: String,
    pub source_language: Language,
    pub target_language: Language,
    pub input_type: InputModality,
    pub output_type: OutputModality,
    pub operations_performed: Vec<Operation>,
    pub intermediate_results: IntermediateResults,
    pub message: String,
}

impl OperationResponse {
    pub fn from_result(result: PipelineResult) -> Self {
        let message = describe(&result);
        Self {
            success: true,
            final_output: result.final_output,
            source_language: result.source_language,
            target_language: result.target_language,
            input_type: result.input_type,
            output_type: result.output_type,
            operations_performed: result.operations_performed,
            intermediate_results: result.intermediate_results,
            message,
        }
    }
}

/// A supported input/output pairing, for discovery endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Combination {
    pub input: InputModality,
    pub output: OutputModality,
    pub description: &'static str,
    pub example: String,
    /// Operations a cross-language request of this kind runs.
    pub operations: Vec<Operation>,
}

/// Every input/output pairing the planner handles.
pub fn combinations() -> Vec<Combination> {
    const ENTRIES: [(InputModality, OutputModality, &str); 6] = [
        (InputModality::Text, OutputModality::Text, "Text translation or pass-through"),
        (InputModality::Text, OutputModality::Audio, "Text to speech with optional translation"),
        (InputModality::Audio, OutputModality::Text, "Speech recognition with optional translation"),
        (InputModality::Audio, OutputModality::Audio, "Audio translation (speech-to-speech)"),
        (InputModality::Image, OutputModality::Text, "OCR with optional translation"),
        (InputModality::Image, OutputModality::Audio, "OCR to speech with optional translation"),
    ];

    ENTRIES
        .into_iter()
        .map(|(input, output, description)| Combination {
            input,
            output,
            description,
            example: format!(
                "{} {input} → {} {output}",
                Language::Hindi.display_name(),
                Language::English.display_name()
            ),
            operations: planner::plan(input, output, Language::Hindi, Language::English).operations,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Language::*;

    fn result(
        input: InputModality,
        output: OutputModality,
        source: Language,
        target: Language,
    ) -> PipelineResult {
        let plan = planner::plan(input, output, source, target);
        PipelineResult {
            final_output: "out".into(),
            source_language: source,
            target_language: target,
            final_language: target,
            input_type: input,
            output_type: output,
            operations_performed: plan.operations,
            intermediate_results: IntermediateResults::default(),
            duration_ms: 0,
        }
    }

    #[test]
    fn test_message_table() {
        use InputModality as I;
        use OutputModality as O;

        let cases = [
            (I::Text, O::Text, Hindi, Hindi, "Text returned as-is (same language: Hindi)"),
            (I::Text, O::Text, Hindi, English, "Translated from Hindi to English"),
            (I::Text, O::Audio, Hindi, English, "Converted Hindi text to English audio"),
            (I::Audio, O::Text, Telugu, Telugu, "Transcribed Telugu audio to text"),
            (
                I::Audio,
                O::Text,
                Telugu,
                Kannada,
                "Transcribed and translated Telugu audio to Kannada text",
            ),
            (I::Audio, O::Audio, Telugu, Telugu, "Converted Telugu audio to Telugu audio"),
            (I::Image, O::Text, Kannada, Kannada, "Extracted Kannada text from image"),
            (
                I::Image,
                O::Text,
                Kannada,
                English,
                "Extracted Kannada text from image and translated to English",
            ),
            (
                I::Image,
                O::Audio,
                English,
                Hindi,
                "Extracted English text from image and converted to Hindi audio",
            ),
        ];

        for (input, output, source, target, expected) in cases {
            assert_eq!(describe(&result(input, output, source, target)), expected);
        }
    }

    #[test]
    fn test_response_shape() {
        let mut r = result(
            InputModality::Audio,
            OutputModality::Audio,
            Hindi,
            English,
        );
        r.intermediate_results = IntermediateResults::default()
            .with(Operation::Recognize, "namaste".into())
            .with(Operation::Translate, "hello".into())
            .with(Operation::Synthesize, "out".into());

        let json = serde_json::to_value(OperationResponse::from_result(r)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["source_language"], "hi");
        assert_eq!(json["input_type"], "audio");
        assert_eq!(json["operations_performed"], serde_json::json!(["asr", "mt", "tts"]));
        assert_eq!(json["intermediate_results"]["translated_text"], "hello");
        assert_eq!(json["message"], "Converted Hindi audio to English audio");
    }

    #[test]
    fn test_combinations_cover_all_pairings() {
        let all = combinations();
        assert_eq!(all.len(), 6);
        assert_eq!(all[3].example, "Hindi audio → English audio");
        assert_eq!(
            all[5].operations,
            [Operation::Extract, Operation::Translate, Operation::Synthesize]
        );
    }
}
