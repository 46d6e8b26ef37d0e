use thiserror::Error;

use crate::types::Operation;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures raised while planning or running a pipeline.
///
/// The first failing step aborts the run; callers get exactly one of these
/// and never a partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported language: {code}. Supported: {supported}")]
    InvalidLanguage { code: String, supported: String },

    /// A step received a payload of the wrong modality (e.g. text handed to ASR).
    #[error("{operation} cannot consume {found} input")]
    InvalidModalityCombination {
        operation: Operation,
        found: &'static str,
    },

    #[error("{operation} for {scope} not configured")]
    CapabilityUnavailable { operation: Operation, scope: String },

    #[error("Provider access token not configured (set provider.api_key or ${env_var})")]
    CredentialMissing { env_var: String },

    #[error("{operation} upstream error: {message}")]
    Upstream {
        operation: Operation,
        message: String,
        timeout: bool,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    /// Stable short name used in logs, metrics labels and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidLanguage { .. } => "invalid_language",
            Self::InvalidModalityCombination { .. } => "invalid_modality_combination",
            Self::CapabilityUnavailable { .. } => "capability_unavailable",
            Self::CredentialMissing { .. } => "credential_missing",
            Self::Upstream { timeout: true, .. } => "upstream_timeout",
            Self::Upstream { .. } => "upstream_error",
            Self::Validation(_) => "validation_failed",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Upstream { timeout: true, .. })
    }

    /// True when the caller sent something we will never accept as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLanguage { .. }
                | Self::InvalidModalityCombination { .. }
                | Self::Validation(_)
        )
    }

    pub fn upstream(operation: Operation, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            message: message.into(),
            timeout: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_distinguishes_timeout() {
        let slow = PipelineError::Upstream {
            operation: Operation::Translate,
            message: "deadline elapsed".into(),
            timeout: true,
        };
        let broken = PipelineError::upstream(Operation::Translate, "HTTP 503");
        assert_eq!(slow.kind(), "upstream_timeout");
        assert!(slow.is_timeout());
        assert_eq!(broken.kind(), "upstream_error");
        assert!(!broken.is_timeout());
    }

    #[test]
    fn test_client_vs_server_errors() {
        let lang = PipelineError::InvalidLanguage {
            code: "fr".into(),
            supported: "en, hi".into(),
        };
        assert!(lang.is_client_error());

        let missing = PipelineError::CapabilityUnavailable {
            operation: Operation::Recognize,
            scope: "kn".into(),
        };
        assert!(!missing.is_client_error());
        assert_eq!(missing.to_string(), "ASR for kn not configured");
    }
}
