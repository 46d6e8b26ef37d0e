//! Unified endpoints: pick languages and output type, the pipeline does the rest.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Deserialize;
use serde_json::{Value, json};

use bhasha_core::language::{self, Language};
use bhasha_core::types::{OutputModality, Payload, VoiceGender};
use bhasha_pipeline::describe::combinations;
use bhasha_pipeline::{OperationResponse, PipelineRequest};

use crate::error::ApiResult;
use crate::multipart::UploadForm;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct TextOperationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

fn parse_output(raw: Option<&str>) -> ApiResult<OutputModality> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(s.parse()?),
        _ => Ok(OutputModality::Text),
    }
}

async fn run(state: &GatewayState, request: PipelineRequest) -> ApiResult<Json<OperationResponse>> {
    let result = state.executor.run(request).await?;

    #[cfg(feature = "metrics")]
    crate::metrics::record_pipeline(&result);

    Ok(Json(OperationResponse::from_result(result)))
}

pub async fn process_text(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<TextOperationRequest>,
) -> ApiResult<Json<OperationResponse>> {
    let output = parse_output(req.output_type.as_deref())?;
    let request = PipelineRequest::new(
        Payload::Text(req.text),
        req.source_language,
        req.target_language,
        output,
    )
    .with_gender(VoiceGender::from_loose(req.gender.as_deref()));

    run(&state, request).await
}

/// Shared body of the audio and image handlers.
async fn process_upload(
    state: &GatewayState,
    multipart: Multipart,
    file_field: &str,
    wrap: fn(bhasha_core::types::MediaBlob) -> Payload,
) -> ApiResult<Json<OperationResponse>> {
    let mut form = UploadForm::read(multipart, file_field).await?;
    let blob = form.take_file(file_field)?;
    let output = parse_output(form.optional("output_type"))?;

    let request = PipelineRequest::new(
        wrap(blob),
        form.required("source_language")?,
        form.required("target_language")?,
        output,
    )
    .with_gender(VoiceGender::from_loose(form.optional("gender")));

    run(state, request).await
}

pub async fn process_audio(
    State(state): State<Arc<GatewayState>>,
    multipart: Multipart,
) -> ApiResult<Json<OperationResponse>> {
    process_upload(&state, multipart, "audio_file", Payload::Audio).await
}

pub async fn process_image(
    State(state): State<Arc<GatewayState>>,
    multipart: Multipart,
) -> ApiResult<Json<OperationResponse>> {
    process_upload(&state, multipart, "image_file", Payload::Image).await
}

pub async fn supported_languages() -> Json<Value> {
    let languages: Vec<Value> = language::supported()
        .iter()
        .map(|lang: &Language| json!({ "code": lang.code(), "name": lang.display_name() }))
        .collect();
    Json(json!({ "supported_languages": languages }))
}

pub async fn operation_combinations() -> Json<Value> {
    Json(json!({ "combinations": combinations() }))
}
