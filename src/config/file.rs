//! TOML settings file loading
//!
//! Supports `youorme.toml` in the working directory as an optional settings
//! source. All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Default settings file name, resolved against the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "youorme.toml";

/// Top-level TOML settings file schema
#[derive(Debug, Default, Deserialize)]
pub struct SettingsFile {
    /// Where the credential document lives
    pub credential_file: Option<String>,

    /// Where the favorites document lives
    pub favorites_file: Option<String>,

    /// Question generation settings
    #[serde(default)]
    pub question: QuestionFileConfig,

    /// Voice/audio settings
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Question generation settings
#[derive(Debug, Default, Deserialize)]
pub struct QuestionFileConfig {
    /// Model identifier (e.g. "openai/gpt-3.5-turbo")
    pub model: Option<String>,

    /// Chat-completions endpoint URL
    pub endpoint: Option<String>,

    /// Token cap for the generated question
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Voice processing settings
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Seconds to wait for the player to start talking
    pub listen_timeout_secs: Option<u64>,

    /// Seconds spent sampling ambient noise before each listen
    pub calibration_secs: Option<u64>,

    /// Spoken language (e.g. "en")
    pub language: Option<String>,

    /// TTS provider ("google" or "openai")
    pub tts_provider: Option<String>,

    /// TTS voice identifier (`OpenAI` only, e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS model (`OpenAI` only, e.g. "tts-1")
    pub tts_model: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Whisper-compatible transcription endpoint
    pub stt_endpoint: Option<String>,

    /// `OpenAI` API key for STT/TTS
    pub openai_api_key: Option<String>,

    /// Timeout in seconds for each STT/TTS request
    pub request_timeout_secs: Option<u64>,
}

/// Load the TOML settings file at `path`
///
/// Returns `SettingsFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_settings_file(path: &Path) -> SettingsFile {
    if !path.exists() {
        return SettingsFile::default();
    }

    match read_settings_file(path) {
        Ok(settings) => {
            tracing::info!(path = %path.display(), "loaded settings file");
            settings
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load settings file, using defaults"
            );
            SettingsFile::default()
        }
    }
}

/// Read and parse the TOML settings file at `path`
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be read and
/// [`crate::Error::Toml`] if it is not valid settings TOML
pub fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_file(&dir.path().join("nope.toml"));
        assert!(settings.question.model.is_none());
        assert!(settings.voice.tts_provider.is_none());
    }

    #[test]
    fn partial_file_overlays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("youorme.toml");
        std::fs::write(
            &path,
            r#"
favorites_file = "faves.json"

[question]
model = "meta-llama/llama-3-8b-instruct"

[voice]
listen_timeout_secs = 8
"#,
        )
        .unwrap();

        let settings = load_settings_file(&path);
        assert_eq!(settings.favorites_file.as_deref(), Some("faves.json"));
        assert_eq!(
            settings.question.model.as_deref(),
            Some("meta-llama/llama-3-8b-instruct")
        );
        assert!(settings.question.endpoint.is_none());
        assert_eq!(settings.voice.listen_timeout_secs, Some(8));
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("youorme.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let settings = load_settings_file(&path);
        assert!(settings.credential_file.is_none());
    }

    #[test]
    fn parse_failure_is_a_toml_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("youorme.toml");
        std::fs::write(&path, "[voice]\nlisten_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            read_settings_file(&path),
            Err(crate::Error::Toml(_))
        ));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists but cannot be read as a file
        assert!(matches!(
            read_settings_file(dir.path()),
            Err(crate::Error::Io(_))
        ));
    }
}
