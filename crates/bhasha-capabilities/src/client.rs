//! Shared HTTP plumbing for the hosted capability endpoints.
//!
//! Every call authenticates with an `access-token` header and reads its
//! result from `data.<field>` in the JSON response.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use bhasha_core::config::{EndpointsConfig, LimitsConfig, ProviderConfig};
use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{MediaBlob, Operation};

/// Client for the Bhashini-style capability API.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools connections.
pub struct BhashiniClient {
    http: reqwest::Client,
    token: Option<String>,
    token_env: String,
    pub(crate) endpoints: EndpointsConfig,
    pub(crate) limits: LimitsConfig,
}

/// A resolved endpoint plus the token to present to it.
pub(crate) struct Target<'a> {
    pub url: &'a str,
    pub token: &'a str,
}

impl BhashiniClient {
    pub fn new(provider: &ProviderConfig, limits: LimitsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(provider.connect_timeout_secs))
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            token: provider.resolve_api_key(),
            token_env: provider.api_key_env_name().to_string(),
            endpoints: provider.endpoints.clone(),
            limits,
        })
    }

    /// Pair a looked-up endpoint with the access token.
    ///
    /// A missing endpoint is reported before a missing token.
    pub(crate) fn target<'a>(
        &'a self,
        operation: Operation,
        scope: String,
        endpoint: Option<&'a str>,
    ) -> Result<Target<'a>, PipelineError> {
        let url = endpoint.ok_or(PipelineError::CapabilityUnavailable { operation, scope })?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| PipelineError::CredentialMissing {
                env_var: self.token_env.clone(),
            })?;
        Ok(Target { url, token })
    }

    pub(crate) fn language_target(
        &self,
        operation: Operation,
        language: Language,
    ) -> Result<Target<'_>, PipelineError> {
        let endpoint = self.endpoints.language_endpoint(operation, language);
        self.target(operation, language.code().to_string(), endpoint)
    }

    /// POST a JSON body and return `data.<field>`.
    pub(crate) async fn post_json(
        &self,
        operation: Operation,
        target: Target<'_>,
        body: &Value,
        field: &str,
    ) -> Result<String, PipelineError> {
        debug!(%operation, url = target.url, "Calling capability");
        let resp = self
            .http
            .post(target.url)
            .header("access-token", target.token)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        read_field(operation, resp, field).await
    }

    /// POST a single file as multipart form data and return `data.<field>`.
    pub(crate) async fn post_file(
        &self,
        operation: Operation,
        target: Target<'_>,
        part_name: &'static str,
        blob: &MediaBlob,
        field: &str,
    ) -> Result<String, PipelineError> {
        debug!(
            %operation,
            url = target.url,
            bytes = blob.len(),
            "Uploading file to capability"
        );
        let part = reqwest::multipart::Part::bytes(blob.data.clone())
            .file_name(blob.file_name.clone())
            .mime_str(&blob.content_type)
            .map_err(|e| PipelineError::upstream(operation, e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(part_name, part);

        let resp = self
            .http
            .post(target.url)
            .header("access-token", target.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        read_field(operation, resp, field).await
    }
}

fn transport_error(operation: Operation, err: reqwest::Error) -> PipelineError {
    PipelineError::Upstream {
        operation,
        message: err.to_string(),
        timeout: err.is_timeout(),
    }
}

async fn read_field(
    operation: Operation,
    resp: reqwest::Response,
    field: &str,
) -> Result<String, PipelineError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(PipelineError::upstream(
            operation,
            format!("HTTP {status}: {}", truncate(&body, 200)),
        ));
    }

    let body: Value = resp
        .json()
        .await
        .map_err(|e| transport_error(operation, e))?;
    Ok(extract_field(&body, field))
}

/// `data.<field>` as a string; absent or non-string values read as empty.
pub fn extract_field(body: &Value, field: &str) -> String {
    body.get("data")
        .and_then(|d| d.get(field))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
