//! Pre-flight input checks, run once the plan is known and before any capability call.

use bhasha_core::config::LimitsConfig;
use bhasha_core::types::Payload;
use bhasha_core::validation::{self, ValidationError};

use crate::planner::PipelinePlan;

/// Hold the request input to the limits of the first capability that will consume it.
///
/// Text is held to the MT word limit when the plan translates, otherwise to the
/// TTS limit when it synthesizes. Pass-through text is not limited.
pub fn validate_input(
    input: &Payload,
    plan: &PipelinePlan,
    limits: &LimitsConfig,
) -> Result<(), ValidationError> {
    match input {
        Payload::Text(text) => {
            if plan.translates() {
                validation::ensure_mt_text(text, limits)
            } else if plan.synthesizes() {
                validation::ensure_tts_text(text, limits)
            } else {
                Ok(())
            }
        }
        Payload::Audio(blob) => validation::ensure_audio(blob, limits).map(|_| ()),
        Payload::Image(blob) => validation::ensure_image(blob, limits),
        Payload::AudioUrl(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use bhasha_core::language::Language;
    use bhasha_core::types::{InputModality, MediaBlob, OutputModality};

    fn words(n: usize) -> Payload {
        Payload::Text(vec!["shabd"; n].join(" "))
    }

    #[test]
    fn test_translating_plan_uses_mt_limit() {
        let limits = LimitsConfig::default();
        let p = plan(
            InputModality::Text,
            OutputModality::Audio,
            Language::Hindi,
            Language::English,
        );
        assert!(validate_input(&words(40), &p, &limits).is_ok());
        assert_eq!(
            validate_input(&words(51), &p, &limits).unwrap_err(),
            ValidationError::MtWordLimit { max: 50 }
        );
    }

    #[test]
    fn test_synth_only_plan_uses_tts_limit() {
        let limits = LimitsConfig::default();
        let p = plan(
            InputModality::Text,
            OutputModality::Audio,
            Language::Hindi,
            Language::Hindi,
        );
        assert_eq!(
            validate_input(&words(31), &p, &limits).unwrap_err(),
            ValidationError::TtsWordLimit { max: 30 }
        );
    }

    #[test]
    fn test_passthrough_is_unlimited() {
        let limits = LimitsConfig::default();
        let p = plan(
            InputModality::Text,
            OutputModality::Text,
            Language::English,
            Language::English,
        );
        assert!(validate_input(&words(500), &p, &limits).is_ok());
    }

    #[test]
    fn test_blobs_checked_by_type() {
        let limits = LimitsConfig::default();
        let p = plan(
            InputModality::Image,
            OutputModality::Text,
            Language::English,
            Language::English,
        );
        let bmp = Payload::Image(MediaBlob::new(vec![0u8; 16], "a.bmp", "image/bmp"));
        assert_eq!(
            validate_input(&bmp, &p, &limits).unwrap_err(),
            ValidationError::ImageNotSupported
        );

        let audio = Payload::Audio(MediaBlob::new(vec![0u8; 16], "a.wav", "audio/wav"));
        assert_eq!(
            validate_input(&audio, &p, &limits).unwrap_err(),
            ValidationError::InvalidWav
        );
    }
}
