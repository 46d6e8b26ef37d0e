use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical form of the content a caller submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    Text,
    Audio,
    Image,
}

/// Physical form of the artifact a caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputModality {
    #[default]
    Text,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported {kind} type: {value}. Expected one of: {expected}")]
pub struct ParseModalityError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl InputModality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }
}

impl OutputModality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
        }
    }
}

impl FromStr for InputModality {
    type Err = ParseModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            _ => Err(ParseModalityError {
                kind: "input",
                value: s.to_string(),
                expected: "text, audio, image",
            }),
        }
    }
}

impl FromStr for OutputModality {
    type Err = ParseModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            _ => Err(ParseModalityError {
                kind: "output",
                value: s.to_string(),
                expected: "text, audio",
            }),
        }
    }
}

impl fmt::Display for InputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OutputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single capability invocation in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Speech recognition (ASR).
    #[serde(rename = "asr")]
    Recognize,
    /// Optical character recognition (OCR).
    #[serde(rename = "ocr")]
    Extract,
    /// Machine translation (MT).
    #[serde(rename = "mt")]
    Translate,
    /// Speech synthesis (TTS).
    #[serde(rename = "tts")]
    Synthesize,
}

impl Operation {
    /// Name used in API responses (`operations_performed`).
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Recognize => "asr",
            Self::Extract => "ocr",
            Self::Translate => "mt",
            Self::Synthesize => "tts",
        }
    }

    /// Key under which the step's artifact is recorded.
    pub fn result_key(self) -> &'static str {
        match self {
            Self::Recognize => "asr_text",
            Self::Extract => "ocr_text",
            Self::Translate => "translated_text",
            Self::Synthesize => "tts_audio_url",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recognize => "ASR",
            Self::Extract => "OCR",
            Self::Translate => "MT",
            Self::Synthesize => "TTS",
        })
    }
}

/// Voice used for speech synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Male,
    #[default]
    Female,
}

impl VoiceGender {
    /// Lenient parse: anything other than "male"/"female" falls back to female.
    pub fn from_loose(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("male") => Self::Male,
            _ => Self::Female,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded binary file (audio or image) held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl MediaBlob {
    pub fn new(data: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The data flowing between pipeline steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Audio(MediaBlob),
    Image(MediaBlob),
    /// Location of synthesized audio returned by the TTS provider.
    AudioUrl(String),
}

impl Payload {
    pub fn modality(&self) -> InputModality {
        match self {
            Self::Text(_) => InputModality::Text,
            Self::Audio(_) | Self::AudioUrl(_) => InputModality::Audio,
            Self::Image(_) => InputModality::Image,
        }
    }

    /// Short description for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Audio(_) => "audio",
            Self::Image(_) => "image",
            Self::AudioUrl(_) => "audio url",
        }
    }

    /// String form of a terminal artifact: the text itself or the audio location.
    pub fn as_output_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::AudioUrl(s) => Some(s),
            Self::Audio(_) | Self::Image(_) => None,
        }
    }
}
