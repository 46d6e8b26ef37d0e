//! Sequential pipeline executor.
//!
//! Each step consumes the previous [`StepState`] and yields a new one; the first
//! failing step ends the run and its state is dropped.

use std::time::Instant;

use tracing::{debug, info, warn};

use bhasha_capabilities::Capabilities;
use bhasha_core::config::LimitsConfig;
use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{Operation, Payload, VoiceGender};

use crate::planner::{self, PipelinePlan};
use crate::{IntermediateResults, PipelineRequest, PipelineResult, gate};

/// Snapshot between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepState {
    pub payload: Payload,
    /// Source language until Translate runs, target language after.
    pub language: Language,
    pub results: IntermediateResults,
}

impl StepState {
    pub fn initial(payload: Payload, source: Language) -> Self {
        Self {
            payload,
            language: source,
            results: IntermediateResults::default(),
        }
    }
}

pub struct PipelineExecutor {
    capabilities: Capabilities,
    limits: LimitsConfig,
}

impl PipelineExecutor {
    pub fn new(capabilities: Capabilities, limits: LimitsConfig) -> Self {
        Self {
            capabilities,
            limits,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Validate languages and input, plan, then execute.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineResult, PipelineError> {
        let plan = planner::plan_for_codes(
            request.input.modality(),
            request.output,
            &request.source_language,
            &request.target_language,
        )?;
        gate::validate_input(&request.input, &plan, &self.limits)?;

        self.execute(&plan, request.input, request.gender).await
    }

    /// Execute an already-validated plan.
    pub async fn execute(
        &self,
        plan: &PipelinePlan,
        input: Payload,
        gender: VoiceGender,
    ) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        debug!(
            input = %plan.input,
            output = %plan.output,
            source = plan.source.code(),
            target = plan.target.code(),
            operations = ?plan.wire_names(),
            "Executing pipeline"
        );

        let mut state = StepState::initial(input, plan.source);
        for &operation in &plan.operations {
            state = match self.step(state, operation, plan, gender).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(%operation, kind = e.kind(), error = %e, "Pipeline step failed");
                    return Err(e);
                }
            };
        }

        let final_output = match state.payload.as_output_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(PipelineError::InvalidModalityCombination {
                    operation: plan.operations.last().copied().unwrap_or(Operation::Translate),
                    found: state.payload.kind_name(),
                });
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            operations = ?plan.wire_names(),
            final_language = state.language.code(),
            duration_ms,
            "Pipeline completed"
        );

        Ok(PipelineResult {
            final_output,
            source_language: plan.source,
            target_language: plan.target,
            final_language: state.language,
            input_type: plan.input,
            output_type: plan.output,
            operations_performed: plan.operations.clone(),
            intermediate_results: state.results,
            duration_ms,
        })
    }

    /// Run one operation against the current state.
    pub async fn step(
        &self,
        state: StepState,
        operation: Operation,
        plan: &PipelinePlan,
        gender: VoiceGender,
    ) -> Result<StepState, PipelineError> {
        let started = Instant::now();
        let mismatch = |payload: &Payload| PipelineError::InvalidModalityCombination {
            operation,
            found: payload.kind_name(),
        };

        let (output, language) = match (operation, &state.payload) {
            (Operation::Recognize, Payload::Audio(blob)) => {
                let text = self.capabilities.asr.recognize(blob, state.language).await?;
                (text, state.language)
            }
            (Operation::Extract, Payload::Image(blob)) => {
                let text = self.capabilities.ocr.extract(blob, state.language).await?;
                (text, state.language)
            }
            (Operation::Translate, Payload::Text(text)) => {
                let translated = self
                    .capabilities
                    .mt
                    .translate(text, plan.source, plan.target)
                    .await?;
                (translated, plan.target)
            }
            (Operation::Synthesize, Payload::Text(text)) => {
                let url = self
                    .capabilities
                    .tts
                    .synthesize(text, state.language, gender)
                    .await?;
                (url, state.language)
            }
            (_, payload) => return Err(mismatch(payload)),
        };

        debug!(
            %operation,
            language = language.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Step completed"
        );

        let payload = match operation {
            Operation::Synthesize => Payload::AudioUrl(output.clone()),
            _ => Payload::Text(output.clone()),
        };
        Ok(StepState {
            payload,
            language,
            results: state.results.with(operation, output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use bhasha_capabilities::{SpeechRecognizer, SpeechSynthesizer, TextExtractor, Translator};
    use bhasha_core::types::{InputModality, MediaBlob, OutputModality};

    /// Records every call as "op:lang" and answers deterministically.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn log(&self, entry: String) {
            self.calls.lock().unwrap().push(entry);
        }

        fn check(&self, op: &'static str, operation: Operation) -> Result<(), PipelineError> {
            if self.fail_on == Some(op) {
                return Err(PipelineError::upstream(operation, "injected failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SpeechRecognizer for Recorder {
        async fn recognize(&self, _audio: &MediaBlob, language: Language) -> Result<String, PipelineError> {
            self.log(format!("asr:{language}"));
            self.check("asr", Operation::Recognize)?;
            Ok(format!("spoken-{language}"))
        }
    }

    #[async_trait]
    impl TextExtractor for Recorder {
        async fn extract(&self, _image: &MediaBlob, language: Language) -> Result<String, PipelineError> {
            self.log(format!("ocr:{language}"));
            self.check("ocr", Operation::Extract)?;
            Ok(format!("written-{language}"))
        }
    }

    #[async_trait]
    impl Translator for Recorder {
        async fn translate(
            &self,
            text: &str,
            source: Language,
            target: Language,
        ) -> Result<String, PipelineError> {
            self.log(format!("mt:{source}-{target}"));
            self.check("mt", Operation::Translate)?;
            Ok(format!("{text}->{target}"))
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for Recorder {
        async fn synthesize(
            &self,
            _text: &str,
            language: Language,
            gender: VoiceGender,
        ) -> Result<String, PipelineError> {
            self.log(format!("tts:{language}:{gender}"));
            self.check("tts", Operation::Synthesize)?;
            Ok(format!("https://audio/{language}.wav"))
        }
    }

    fn executor(recorder: Arc<Recorder>) -> PipelineExecutor {
        let capabilities = Capabilities {
            asr: recorder.clone(),
            ocr: recorder.clone(),
            mt: recorder.clone(),
            tts: recorder,
        };
        PipelineExecutor::new(capabilities, LimitsConfig::default())
    }

    fn image() -> Payload {
        Payload::Image(MediaBlob::new(vec![0xFF, 0xD8], "board.jpg", "image/jpeg"))
    }

    #[tokio::test]
    async fn test_passthrough_returns_input_unchanged() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let p = planner::plan(
            InputModality::Text,
            OutputModality::Text,
            Language::Hindi,
            Language::Hindi,
        );

        let result = exec
            .execute(&p, Payload::Text("  jaise ka taisa ".into()), VoiceGender::Female)
            .await
            .unwrap();
        assert_eq!(result.final_output, "  jaise ka taisa ");
        assert!(result.intermediate_results.is_empty());
        assert!(result.operations_performed.is_empty());
        assert_eq!(result.final_language, Language::Hindi);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_uses_translated_language() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let p = planner::plan(
            InputModality::Image,
            OutputModality::Audio,
            Language::Kannada,
            Language::English,
        );

        let result = exec.execute(&p, image(), VoiceGender::Male).await.unwrap();
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            ["ocr:kn", "mt:kn-en", "tts:en:male"]
        );
        assert_eq!(result.final_output, "https://audio/en.wav");
        assert_eq!(result.final_language, Language::English);
        assert_eq!(
            result.intermediate_results.keys(),
            ["ocr_text", "translated_text", "tts_audio_url"]
        );
        assert_eq!(
            result.intermediate_results.get(Operation::Translate),
            Some("written-kn->en")
        );
    }

    #[tokio::test]
    async fn test_language_stays_put_without_translation() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let p = planner::plan(
            InputModality::Text,
            OutputModality::Audio,
            Language::Telugu,
            Language::Telugu,
        );

        let result = exec
            .execute(&p, Payload::Text("namaskaram".into()), VoiceGender::Female)
            .await
            .unwrap();
        assert_eq!(*recorder.calls.lock().unwrap(), ["tts:te:female"]);
        assert_eq!(result.final_language, Language::Telugu);
    }

    #[tokio::test]
    async fn test_failure_in_second_step_aborts() {
        let recorder = Arc::new(Recorder {
            fail_on: Some("mt"),
            ..Recorder::default()
        });
        let exec = executor(recorder.clone());
        let p = planner::plan(
            InputModality::Image,
            OutputModality::Audio,
            Language::Hindi,
            Language::English,
        );

        let err = exec.execute(&p, image(), VoiceGender::Female).await.unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
        assert_eq!(*recorder.calls.lock().unwrap(), ["ocr:hi", "mt:hi-en"]);

        // Folding by hand shows the state the failed run discarded.
        let state = StepState::initial(image(), p.source);
        let state = exec
            .step(state, Operation::Extract, &p, VoiceGender::Female)
            .await
            .unwrap();
        assert_eq!(state.results.len(), 1);
        assert!(
            exec.step(state, Operation::Translate, &p, VoiceGender::Female)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_step_rejects_wrong_payload() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let p = planner::plan(
            InputModality::Audio,
            OutputModality::Text,
            Language::English,
            Language::English,
        );

        let err = exec
            .execute(&p, Payload::Text("not audio".into()), VoiceGender::Female)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidModalityCombination {
                operation: Operation::Recognize,
                found: "text"
            }
        ));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_language_before_any_call() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());

        let request = PipelineRequest::new(
            Payload::Text("bonjour".into()),
            "fr",
            "en",
            OutputModality::Text,
        );
        let err = exec.run(request).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_language");
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_validates_before_any_call() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());

        let request = PipelineRequest::new(
            Payload::Text(vec!["w"; 60].join(" ")),
            "en",
            "hi",
            OutputModality::Text,
        );
        let err = exec.run(request).await.unwrap_err();
        assert_eq!(err.kind(), "validation_failed");
        assert!(recorder.calls.lock().unwrap().is_empty());
    }
}
