//! Input limits for the hosted capabilities.
//!
//! Every check here is pure: it inspects text or an in-memory blob and either
//! returns `Ok` or a [`ValidationError`] whose message is shown to callers verbatim.

use std::io::Cursor;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::config::LimitsConfig;
use crate::types::MediaBlob;

/// Slack allowed on top of `max_asr_seconds` before audio is rejected.
const DURATION_TOLERANCE_SECS: f64 = 0.5;

const AUDIO_CONTENT_TYPES: &[&str] = &["audio/wav", "audio/x-wav", "audio/wave", "audio/vnd.wave"];
const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("MT limit exceeded: max {max} words")]
    MtWordLimit { max: usize },

    #[error("TTS limit exceeded: max {max} words")]
    TtsWordLimit { max: usize },

    #[error("ASR audio too large: {size_mb:.2} MB > {max_mb} MB")]
    AudioTooLarge { size_mb: f64, max_mb: f64 },

    #[error("ASR requires WAV audio")]
    AudioNotWav,

    #[error("Invalid WAV file")]
    InvalidWav,

    #[error("ASR audio too long: {seconds:.1}s > {max_seconds}s")]
    AudioTooLong { seconds: f64, max_seconds: f64 },

    #[error("OCR file too large: {size_mb:.2} MB > {max_mb} MB")]
    ImageTooLarge { size_mb: f64, max_mb: f64 },

    #[error("OCR requires JPG or PNG image")]
    ImageNotSupported,
}

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:'\w+)?").expect("word pattern is valid"));

/// Count words the way the provider quotas do: runs of word characters,
/// with an optional apostrophe suffix ("don't" is one word).
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

pub fn ensure_mt_text(text: &str, limits: &LimitsConfig) -> Result<(), ValidationError> {
    if count_words(text) > limits.max_mt_words {
        return Err(ValidationError::MtWordLimit {
            max: limits.max_mt_words,
        });
    }
    Ok(())
}

pub fn ensure_tts_text(text: &str, limits: &LimitsConfig) -> Result<(), ValidationError> {
    if count_words(text) > limits.max_tts_words {
        return Err(ValidationError::TtsWordLimit {
            max: limits.max_tts_words,
        });
    }
    Ok(())
}

fn size_mb(blob: &MediaBlob) -> f64 {
    blob.len() as f64 / (1024.0 * 1024.0)
}

fn content_type_in(blob: &MediaBlob, allowed: &[&str]) -> bool {
    let ct = blob.content_type.trim().to_ascii_lowercase();
    allowed.contains(&ct.as_str())
}

/// Check an audio upload and return its duration in seconds.
pub fn ensure_audio(blob: &MediaBlob, limits: &LimitsConfig) -> Result<f64, ValidationError> {
    let size_mb = size_mb(blob);
    if size_mb > limits.max_asr_mb {
        return Err(ValidationError::AudioTooLarge {
            size_mb,
            max_mb: limits.max_asr_mb,
        });
    }
    if !content_type_in(blob, AUDIO_CONTENT_TYPES) {
        return Err(ValidationError::AudioNotWav);
    }

    let seconds = wav_duration_secs(&blob.data)?;
    if seconds > limits.max_asr_seconds + DURATION_TOLERANCE_SECS {
        return Err(ValidationError::AudioTooLong {
            seconds,
            max_seconds: limits.max_asr_seconds,
        });
    }
    Ok(seconds)
}

/// Duration of a WAV stream, from its header.
pub fn wav_duration_secs(data: &[u8]) -> Result<f64, ValidationError> {
    let reader =
        hound::WavReader::new(Cursor::new(data)).map_err(|_| ValidationError::InvalidWav)?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return Ok(0.0);
    }
    Ok(reader.duration() as f64 / rate as f64)
}

pub fn ensure_image(blob: &MediaBlob, limits: &LimitsConfig) -> Result<(), ValidationError> {
    let size_mb = size_mb(blob);
    if size_mb > limits.max_ocr_mb {
        return Err(ValidationError::ImageTooLarge {
            size_mb,
            max_mb: limits.max_ocr_mb,
        });
    }
    if !content_type_in(blob, IMAGE_CONTENT_TYPES) {
        return Err(ValidationError::ImageNotSupported);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(sample_rate: u32, seconds: f64) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let samples = (sample_rate as f64 * seconds) as usize;
            for _ in 0..samples {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn audio(data: Vec<u8>, content_type: &str) -> MediaBlob {
        MediaBlob::new(data, "clip.wav", content_type)
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("hello world"), 2);
        assert_eq!(count_words("don't stop"), 2);
        assert_eq!(count_words("  spaced   out  "), 2);
        assert_eq!(count_words("नमस्ते दुनिया"), 2);
        assert_eq!(count_words("ಕನ್ನಡ ತೆಲುಗು"), 2);
    }

    #[test]
    fn test_word_limits() {
        let limits = LimitsConfig::default();
        let fifty = vec!["word"; 50].join(" ");
        let fifty_one = vec!["word"; 51].join(" ");
        assert!(ensure_mt_text(&fifty, &limits).is_ok());
        let err = ensure_mt_text(&fifty_one, &limits).unwrap_err();
        assert_eq!(err.to_string(), "MT limit exceeded: max 50 words");

        let thirty_one = vec!["word"; 31].join(" ");
        assert_eq!(
            ensure_tts_text(&thirty_one, &limits).unwrap_err(),
            ValidationError::TtsWordLimit { max: 30 }
        );
    }

    #[test]
    fn test_audio_accepts_short_wav() {
        let limits = LimitsConfig::default();
        let blob = audio(wav_bytes(8000, 2.0), "audio/wav");
        let secs = ensure_audio(&blob, &limits).unwrap();
        assert!((secs - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_audio_duration_tolerance() {
        let limits = LimitsConfig::default();
        let within = audio(wav_bytes(1000, 20.4), "audio/x-wav");
        assert!(ensure_audio(&within, &limits).is_ok());

        let over = audio(wav_bytes(1000, 21.0), "audio/wav");
        let err = ensure_audio(&over, &limits).unwrap_err();
        assert_eq!(err.to_string(), "ASR audio too long: 21.0s > 20s");
    }

    #[test]
    fn test_audio_rejects_wrong_type_and_garbage() {
        let limits = LimitsConfig::default();
        let mp3 = audio(wav_bytes(8000, 1.0), "audio/mpeg");
        assert_eq!(ensure_audio(&mp3, &limits).unwrap_err(), ValidationError::AudioNotWav);

        let garbage = audio(b"definitely not riff".to_vec(), "audio/wav");
        assert_eq!(ensure_audio(&garbage, &limits).unwrap_err(), ValidationError::InvalidWav);
    }

    #[test]
    fn test_audio_size_checked_first() {
        let limits = LimitsConfig {
            max_asr_mb: 0.001,
            ..LimitsConfig::default()
        };
        let blob = audio(vec![0u8; 4096], "audio/mpeg");
        let err = ensure_audio(&blob, &limits).unwrap_err();
        assert!(matches!(err, ValidationError::AudioTooLarge { .. }));
        assert!(err.to_string().starts_with("ASR audio too large: "));
    }

    #[test]
    fn test_image_checks() {
        let limits = LimitsConfig::default();
        let png = MediaBlob::new(vec![0x89, b'P', b'N', b'G'], "sign.png", "image/png");
        assert!(ensure_image(&png, &limits).is_ok());

        let gif = MediaBlob::new(vec![0u8; 10], "sign.gif", "image/gif");
        assert_eq!(
            ensure_image(&gif, &limits).unwrap_err().to_string(),
            "OCR requires JPG or PNG image"
        );

        let huge = MediaBlob::new(vec![0u8; 6 * 1024 * 1024], "big.jpg", "image/jpeg");
        assert_eq!(
            ensure_image(&huge, &limits).unwrap_err().to_string(),
            "OCR file too large: 6.00 MB > 5 MB"
        );
    }
}
