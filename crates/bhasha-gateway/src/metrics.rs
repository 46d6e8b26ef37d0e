//! Prometheus metrics recording and endpoint.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use bhasha_pipeline::PipelineResult;

/// Install the Prometheus metrics recorder and return the handle for rendering.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a completed pipeline run and each capability it called.
pub fn record_pipeline(result: &PipelineResult) {
    let labels = [
        ("input", result.input_type.to_string()),
        ("output", result.output_type.to_string()),
    ];
    metrics::counter!("pipeline_runs_total", &labels).increment(1);
    metrics::histogram!("pipeline_duration_seconds", &labels).record(result.duration_ms as f64 / 1000.0);

    for op in &result.operations_performed {
        let labels = [("operation", op.wire_name().to_string())];
        metrics::counter!("capability_calls_total", &labels).increment(1);
    }
}

/// Record an error of a given kind.
pub fn record_error(kind: &str) {
    let labels = [("kind", kind.to_string())];
    metrics::counter!("errors_total", &labels).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhasha_core::language::Language;
    use bhasha_core::types::{InputModality, Operation, OutputModality};
    use bhasha_pipeline::IntermediateResults;

    #[test]
    fn test_record_pipeline_does_not_panic() {
        // No recorder installed: the metrics crate falls back to a no-op.
        let result = PipelineResult {
            final_output: "hello".into(),
            source_language: Language::Hindi,
            target_language: Language::English,
            final_language: Language::English,
            input_type: InputModality::Text,
            output_type: OutputModality::Text,
            operations_performed: vec![Operation::Translate],
            intermediate_results: IntermediateResults::default(),
            duration_ms: 3,
        };
        record_pipeline(&result);
    }

    #[test]
    fn test_record_error_does_not_panic() {
        record_error("upstream_timeout");
    }
}
