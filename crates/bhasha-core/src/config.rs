//! Configuration loading and validation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::language::Language;
use crate::types::Operation;

/// Top-level Bhasha Relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:5500",
        "http://127.0.0.1:5500",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://localhost:5174",
        "http://127.0.0.1:5174",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Capability provider (ASR/OCR/MT/TTS) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Connect-phase timeout in seconds (default: 30).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-call timeout in seconds (default: 120).
    #[serde(default = "default_call_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

fn default_api_key_env() -> Option<String> {
    Some("BHASHINI_API_KEY".into())
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_call_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_call_timeout(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the access token: check `api_key` first, then the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }

    /// Name of the env var consulted for the token, for error messages.
    pub fn api_key_env_name(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or("BHASHINI_API_KEY")
    }
}

/// Per-capability endpoint tables.
///
/// `asr`, `ocr` and `tts` are keyed by language code; `mt` by `"<src>-<tgt>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_asr_endpoints")]
    pub asr: BTreeMap<String, String>,

    #[serde(default = "default_ocr_endpoints")]
    pub ocr: BTreeMap<String, String>,

    #[serde(default = "default_mt_endpoints")]
    pub mt: BTreeMap<String, String>,

    #[serde(default = "default_tts_endpoints")]
    pub tts: BTreeMap<String, String>,
}

const SANDBOX_BASE: &str = "https://canvas.iiit.ac.in/sandboxbeprod";

fn sandbox_table(route: &str, ids: &[(&str, &str)]) -> BTreeMap<String, String> {
    ids.iter()
        .map(|(key, id)| ((*key).to_string(), format!("{SANDBOX_BASE}/{route}/{id}")))
        .collect()
}

fn default_asr_endpoints() -> BTreeMap<String, String> {
    sandbox_table(
        "infer_asr",
        &[
            ("en", "67127dcbb1a6984f0c5e7d35"),
            ("hi", "67100d22a0397bc812dacb27"),
            ("te", "67b840e29c21bec07537674b"),
            ("kn", "6834189e620e7a7dd24ec499"),
        ],
    )
}

fn default_ocr_endpoints() -> BTreeMap<String, String> {
    sandbox_table(
        "check_ocr_status_and_infer",
        &[
            ("en", "687f420802ae0a1948845594"),
            ("hi", "6711fe751595b8ffe97adc1f"),
            ("te", "687f65f502ae0a19488455b5"),
            ("kn", "687f64db02ae0a19488455b0"),
        ],
    )
}

fn default_tts_endpoints() -> BTreeMap<String, String> {
    sandbox_table(
        "generate_tts",
        &[
            ("en", "67bca8b3e0b95a6a1ea34a93"),
            ("hi", "67bca89ae0b95a6a1ea34a92"),
            ("te", "67b842f39c21bec07537674e"),
            ("kn", "67bca94de0b95a6a1ea34a98"),
        ],
    )
}

fn default_mt_endpoints() -> BTreeMap<String, String> {
    sandbox_table(
        "check_model_status_and_infer",
        &[
            ("en-hi", "67b86729b5cc0eb92316383c"),
            ("en-te", "67b86729b5cc0eb92316389a"),
            ("en-kn", "67b86729b5cc0eb923163823"),
            ("hi-en", "67b86729b5cc0eb92316384a"),
            ("hi-te", "67b86729b5cc0eb92316388e"),
            ("hi-kn", "67b86729b5cc0eb9231638a3"),
            ("te-en", "67b86729b5cc0eb923163869"),
            ("te-hi", "67b86729b5cc0eb923163897"),
            ("te-kn", "67b86729b5cc0eb923163896"),
            ("kn-en", "67b86729b5cc0eb92316389d"),
            ("kn-hi", "67b86729b5cc0eb9231638a9"),
            ("kn-te", "67b86729b5cc0eb9231638b1"),
        ],
    )
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            asr: default_asr_endpoints(),
            ocr: default_ocr_endpoints(),
            mt: default_mt_endpoints(),
            tts: default_tts_endpoints(),
        }
    }
}

impl EndpointsConfig {
    /// Tables with no endpoints at all.
    pub fn empty() -> Self {
        Self {
            asr: BTreeMap::new(),
            ocr: BTreeMap::new(),
            mt: BTreeMap::new(),
            tts: BTreeMap::new(),
        }
    }

    /// Key used in the `mt` table for a language pair.
    pub fn pair_key(source: Language, target: Language) -> String {
        format!("{}-{}", source.code(), target.code())
    }

    /// Endpoint for a single-language capability. Blank entries count as missing.
    pub fn language_endpoint(&self, operation: Operation, language: Language) -> Option<&str> {
        let table = match operation {
            Operation::Recognize => &self.asr,
            Operation::Extract => &self.ocr,
            Operation::Synthesize => &self.tts,
            Operation::Translate => return None,
        };
        table
            .get(language.code())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Endpoint for translating between a language pair.
    pub fn translation_endpoint(&self, source: Language, target: Language) -> Option<&str> {
        self.mt
            .get(&Self::pair_key(source, target))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Input limits enforced before (and, for text, during) a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_mt_words")]
    pub max_mt_words: usize,

    #[serde(default = "default_max_tts_words")]
    pub max_tts_words: usize,

    #[serde(default = "default_max_upload_mb")]
    pub max_asr_mb: f64,

    #[serde(default = "default_max_upload_mb")]
    pub max_ocr_mb: f64,

    /// Maximum audio duration in seconds; half a second of slack is allowed.
    #[serde(default = "default_max_asr_seconds")]
    pub max_asr_seconds: f64,
}

fn default_max_mt_words() -> usize {
    50
}

fn default_max_tts_words() -> usize {
    30
}

fn default_max_upload_mb() -> f64 {
    5.0
}

fn default_max_asr_seconds() -> f64 {
    20.0
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_mt_words: default_max_mt_words(),
            max_tts_words: default_max_tts_words(),
            max_asr_mb: default_max_upload_mb(),
            max_ocr_mb: default_max_upload_mb(),
            max_asr_seconds: default_max_asr_seconds(),
        }
    }
}

impl LimitsConfig {
    /// Largest upload any route accepts, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_asr_mb.max(self.max_ocr_mb) * 1024.0 * 1024.0) as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "bhasha_pipeline=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: None,
            filters: Vec::new(),
            output: default_log_output(),
        }
    }
}

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        let val = val.trim();
        if !val.is_empty() {
            return Some(val.to_string());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            let val = val.trim();
            if !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR_RE
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

/// Endpoint tables are keyed by the exact lowercase code used at lookup time.
fn exact_language(key: &str) -> Option<Language> {
    Language::ALL.into_iter().find(|lang| lang.code() == key)
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let substituted = substitute_env_vars(&raw);
        debug!(path = %path.display(), "Loaded config file");

        json5::from_str(&substituted).map_err(|e| crate::error::RelayError::Config(e.to_string()))
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn provider(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }

    pub fn limits(&self) -> LimitsConfig {
        self.limits.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    pub fn server_port(&self) -> u16 {
        self.server.as_ref().map(|s| s.port).unwrap_or(8000)
    }

    pub fn server_host(&self) -> String {
        self.server
            .as_ref()
            .map(|s| s.host.clone())
            .unwrap_or_else(default_host)
    }

    /// Get a config value by dotted path (e.g. "server.port", "limits.max_mt_words").
    ///
    /// Unset sections resolve against their defaults.
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let resolved = Config {
            server: Some(self.server()),
            provider: Some(self.provider()),
            limits: Some(self.limits()),
            logging: Some(self.logging()),
        };
        let json = serde_json::to_value(resolved).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let provider = self.provider();
        if provider.resolve_api_key().is_none() {
            warnings.push(format!(
                "Provider has no API key configured (set provider.api_key or ${})",
                provider.api_key_env_name()
            ));
        }

        if provider.connect_timeout_secs == 0 || provider.timeout_secs == 0 {
            errors.push("Provider timeouts must be greater than 0".to_string());
        }

        let endpoints = &provider.endpoints;
        for (name, operation, table) in [
            ("asr", Operation::Recognize, &endpoints.asr),
            ("ocr", Operation::Extract, &endpoints.ocr),
            ("tts", Operation::Synthesize, &endpoints.tts),
        ] {
            for key in table.keys() {
                if exact_language(key).is_none() {
                    errors.push(format!("Unknown language '{key}' in provider.endpoints.{name}"));
                }
            }
            for lang in Language::ALL {
                if endpoints.language_endpoint(operation, lang).is_none() {
                    warnings.push(format!("No {name} endpoint configured for {}", lang.code()));
                }
            }
        }

        for key in endpoints.mt.keys() {
            let valid = key
                .split_once('-')
                .map(|(s, t)| {
                    matches!((exact_language(s), exact_language(t)), (Some(a), Some(b)) if a != b)
                })
                .unwrap_or(false);
            if !valid {
                errors.push(format!("Invalid language pair '{key}' in provider.endpoints.mt"));
            }
        }
        for (source, target) in crate::language::translation_pairs() {
            if endpoints.translation_endpoint(source, target).is_none() {
                warnings.push(format!(
                    "No mt endpoint configured for {}",
                    EndpointsConfig::pair_key(source, target)
                ));
            }
        }

        let server = self.server();
        let origins = &server.allowed_origins;
        if origins.len() > 1 && origins.iter().any(|o| o.trim() == "*") {
            warnings.push(
                "server.allowed_origins contains '*'; every origin is allowed and credentials are disabled"
                    .to_string(),
            );
        }

        if server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        let limits = self.limits();
        if limits.max_mt_words == 0 || limits.max_tts_words == 0 {
            errors.push("Word limits must be greater than 0".to_string());
        }

        (warnings, errors)
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Base directory for Bhasha Relay data: `~/.bhasha_relay/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bhasha_relay")
}
