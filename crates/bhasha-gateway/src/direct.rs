//! Single-capability endpoints: translate, ASR, TTS and OCR on their own.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use bhasha_core::language::{self, Language};
use bhasha_core::types::VoiceGender;
use bhasha_core::validation;

use crate::error::{ApiError, ApiResult};
use crate::multipart::UploadForm;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
pub struct PairTranslationRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: Language,
    pub target_language: Language,
    pub language_pair: String,
}

async fn translate_between(
    state: &GatewayState,
    text: String,
    source: &str,
    target: &str,
) -> ApiResult<Json<TranslationResponse>> {
    let source = Language::validate(source)?;
    let target = Language::validate(target)?;
    if source == target {
        return Err(ApiError::bad_request(
            "Source and target languages cannot be the same",
        ));
    }
    validation::ensure_mt_text(&text, state.limits())?;

    let translated_text = state.capabilities.mt.translate(&text, source, target).await?;

    Ok(Json(TranslationResponse {
        original_text: text,
        translated_text,
        source_language: source,
        target_language: target,
        language_pair: language::format_pair(source, target),
    }))
}

pub async fn translate(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<TranslationRequest>,
) -> ApiResult<Json<TranslationResponse>> {
    translate_between(&state, req.text, &req.source_language, &req.target_language).await
}

/// `POST /translate/{src}-to-{tgt}`
pub async fn translate_pair(
    State(state): State<Arc<GatewayState>>,
    Path(pair): Path<String>,
    Json(req): Json<PairTranslationRequest>,
) -> ApiResult<Json<TranslationResponse>> {
    let (source, target) = pair
        .split_once("-to-")
        .ok_or_else(|| ApiError::bad_request(format!("Invalid language pair '{pair}'")))?;
    translate_between(&state, req.text, source, target).await
}

pub async fn supported_pairs() -> Json<Value> {
    let pairs: Vec<Value> = language::translation_pairs()
        .into_iter()
        .map(|(source, target)| {
            json!({
                "source": source.code(),
                "target": target.code(),
                "display_name": language::format_pair(source, target),
            })
        })
        .collect();
    Json(json!({ "supported_pairs": pairs }))
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".into()
}

pub async fn asr(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<LanguageQuery>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let lang = Language::validate(&query.language)?;
    let mut form = UploadForm::read(multipart, "audio_file").await?;
    let audio = form.take_file("audio_file")?;
    validation::ensure_audio(&audio, state.limits())?;

    let recognized_text = state.capabilities.asr.recognize(&audio, lang).await?;

    Ok(Json(json!({
        "recognized_text": recognized_text,
        "language": lang.code(),
        "language_name": lang.display_name(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub language: String,
    #[serde(default)]
    pub gender: Option<String>,
}

pub async fn tts(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<TtsRequest>,
) -> ApiResult<Json<Value>> {
    let lang = Language::validate(&req.language)?;
    validation::ensure_tts_text(&req.text, state.limits())?;
    let gender = VoiceGender::from_loose(req.gender.as_deref());

    let audio_url = state.capabilities.tts.synthesize(&req.text, lang, gender).await?;

    Ok(Json(json!({
        "audio_url": audio_url,
        "text": req.text,
        "language": lang.code(),
        "language_name": lang.display_name(),
        "gender": gender.as_str(),
    })))
}

pub async fn ocr(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<LanguageQuery>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let lang = Language::validate(&query.language)?;
    let mut form = UploadForm::read(multipart, "image_file").await?;
    let image = form.take_file("image_file")?;
    validation::ensure_image(&image, state.limits())?;

    let extracted_text = state.capabilities.ocr.extract(&image, lang).await?;

    Ok(Json(json!({
        "extracted_text": extracted_text,
        "language": lang.code(),
        "language_name": lang.display_name(),
    })))
}

fn capability_languages(describe: fn(&str) -> String) -> Json<Value> {
    let languages: Vec<Value> = language::supported()
        .iter()
        .map(|lang| {
            let name = lang.display_name();
            json!({ "code": lang.code(), "name": name, "description": describe(name) })
        })
        .collect();
    Json(json!({ "supported_languages": languages }))
}

pub async fn asr_languages() -> Json<Value> {
    capability_languages(|name| format!("{name} speech → {name} text"))
}

pub async fn tts_languages() -> Json<Value> {
    capability_languages(|name| format!("{name} text → {name} speech"))
}

pub async fn ocr_languages() -> Json<Value> {
    capability_languages(|name| format!("{name} image → {name} text"))
}
