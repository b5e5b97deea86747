//! Runtime settings for the game
//!
//! Priority for every value: CLI flag > env > `youorme.toml` > default.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use file::SettingsFile;

/// Default credential document, relative to the working directory
pub const DEFAULT_CREDENTIAL_FILE: &str = "config.json";

/// Default favorites document, relative to the working directory
pub const DEFAULT_FAVORITES_FILE: &str = "favorites.json";

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default question model
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Default Whisper-compatible transcription endpoint
pub const DEFAULT_STT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Game configuration
#[derive(Debug)]
pub struct Config {
    /// Path to the credential document
    pub credential_file: PathBuf,

    /// Path to the favorites document
    pub favorites_file: PathBuf,

    /// Question generation settings
    pub question: QuestionConfig,

    /// Voice settings
    pub voice: VoiceConfig,
}

/// Question generation settings
#[derive(Debug, Clone)]
pub struct QuestionConfig {
    /// Model identifier sent with each request
    pub model: String,

    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Token cap for the generated question
    pub max_tokens: u32,

    /// Client-side bound on each request
    pub request_timeout: Duration,
}

/// Which synthesis backend speaks for the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtsProviderKind {
    /// Google Translate voice, no key needed
    #[default]
    Google,
    /// `OpenAI` speech endpoint, needs `openai_api_key`
    OpenAI,
}

impl TtsProviderKind {
    /// Parse a provider name, case-insensitively
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gtts" => Some(Self::Google),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

/// Voice processing settings
#[derive(Debug)]
pub struct VoiceConfig {
    /// Read answers from the keyboard and print instead of speaking
    pub typed: bool,

    /// How long to wait for the player to start talking
    pub listen_timeout: Duration,

    /// How long to sample ambient noise before listening
    pub calibration: Duration,

    /// Spoken language code
    pub language: String,

    /// TTS backend
    pub tts_provider: TtsProviderKind,

    /// TTS voice identifier (`OpenAI`)
    pub tts_voice: String,

    /// TTS model (`OpenAI`)
    pub tts_model: String,

    /// STT model
    pub stt_model: String,

    /// Whisper-compatible transcription endpoint
    pub stt_endpoint: String,

    /// Key for `OpenAI` STT/TTS; without it answers are typed
    pub openai_api_key: Option<SecretString>,

    /// Client-side bound on each STT/TTS request
    pub request_timeout: Duration,
}

/// Values given on the command line, which win over everything else
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--credential-file`
    pub credential_file: Option<PathBuf>,
    /// `--favorites-file`
    pub favorites_file: Option<PathBuf>,
    /// `--typed`
    pub typed: bool,
}

impl Config {
    /// Load settings from the TOML file at `settings_path`, the process
    /// environment, and CLI overrides
    #[must_use]
    pub fn load(settings_path: &Path, overrides: Overrides) -> Self {
        let fc = file::load_settings_file(settings_path);
        Self::from_sources(fc, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge an already-parsed settings file with an environment lookup
    pub fn from_sources(
        fc: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: Overrides,
    ) -> Self {
        let credential_file = overrides
            .credential_file
            .or_else(|| fc.credential_file.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIAL_FILE));
        let favorites_file = overrides
            .favorites_file
            .or_else(|| fc.favorites_file.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FAVORITES_FILE));

        // Question config (env > toml > default)
        let question = QuestionConfig {
            model: env("YOUORME_MODEL")
                .or(fc.question.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: env("YOUORME_ENDPOINT")
                .or(fc.question.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            max_tokens: fc.question.max_tokens.unwrap_or(100),
            request_timeout: Duration::from_secs(fc.question.request_timeout_secs.unwrap_or(30)),
        };

        let tts_provider = env("YOUORME_TTS_PROVIDER")
            .or(fc.voice.tts_provider)
            .map_or_else(TtsProviderKind::default, |name| {
                TtsProviderKind::parse(&name).unwrap_or_else(|| {
                    tracing::warn!(provider = %name, "unknown TTS provider, using google");
                    TtsProviderKind::default()
                })
            });

        // Voice config (flag > env > toml > default)
        let voice = VoiceConfig {
            typed: overrides.typed,
            listen_timeout: Duration::from_secs(
                env("YOUORME_LISTEN_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .or(fc.voice.listen_timeout_secs)
                    .unwrap_or(5),
            ),
            calibration: Duration::from_secs(fc.voice.calibration_secs.unwrap_or(1)),
            language: fc.voice.language.unwrap_or_else(|| "en".to_string()),
            tts_provider,
            tts_voice: fc.voice.tts_voice.unwrap_or_else(|| "alloy".to_string()),
            tts_model: fc.voice.tts_model.unwrap_or_else(|| "tts-1".to_string()),
            stt_model: fc
                .voice
                .stt_model
                .unwrap_or_else(|| "whisper-1".to_string()),
            stt_endpoint: fc
                .voice
                .stt_endpoint
                .unwrap_or_else(|| DEFAULT_STT_ENDPOINT.to_string()),
            openai_api_key: env("OPENAI_API_KEY")
                .or(fc.voice.openai_api_key)
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            request_timeout: Duration::from_secs(fc.voice.request_timeout_secs.unwrap_or(30)),
        };

        Self {
            credential_file,
            favorites_file,
            question,
            voice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use file::{QuestionFileConfig, VoiceFileConfig};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_classic_game() {
        let config = Config::from_sources(SettingsFile::default(), no_env, Overrides::default());
        assert_eq!(config.credential_file, PathBuf::from("config.json"));
        assert_eq!(config.favorites_file, PathBuf::from("favorites.json"));
        assert_eq!(config.question.model, DEFAULT_MODEL);
        assert_eq!(config.question.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.question.max_tokens, 100);
        assert_eq!(config.voice.listen_timeout, Duration::from_secs(5));
        assert_eq!(config.voice.calibration, Duration::from_secs(1));
        assert_eq!(config.voice.request_timeout, Duration::from_secs(30));
        assert_eq!(config.voice.tts_provider, TtsProviderKind::Google);
        assert!(config.voice.openai_api_key.is_none());
        assert!(!config.voice.typed);
    }

    #[test]
    fn env_beats_file() {
        let fc = SettingsFile {
            question: QuestionFileConfig {
                model: Some("from-file".to_string()),
                ..QuestionFileConfig::default()
            },
            ..SettingsFile::default()
        };
        let env = |key: &str| (key == "YOUORME_MODEL").then(|| "from-env".to_string());
        let config = Config::from_sources(fc, env, Overrides::default());
        assert_eq!(config.question.model, "from-env");
    }

    #[test]
    fn flags_beat_file() {
        let fc = SettingsFile {
            favorites_file: Some("file-faves.json".to_string()),
            ..SettingsFile::default()
        };
        let overrides = Overrides {
            favorites_file: Some(PathBuf::from("flag-faves.json")),
            typed: true,
            ..Overrides::default()
        };
        let config = Config::from_sources(fc, no_env, overrides);
        assert_eq!(config.favorites_file, PathBuf::from("flag-faves.json"));
        assert!(config.voice.typed);
    }

    #[test]
    fn unknown_tts_provider_falls_back_to_google() {
        let fc = SettingsFile {
            voice: VoiceFileConfig {
                tts_provider: Some("espeak".to_string()),
                ..VoiceFileConfig::default()
            },
            ..SettingsFile::default()
        };
        let config = Config::from_sources(fc, no_env, Overrides::default());
        assert_eq!(config.voice.tts_provider, TtsProviderKind::Google);
    }

    #[test]
    fn blank_openai_key_is_ignored() {
        let env = |key: &str| (key == "OPENAI_API_KEY").then(|| "  ".to_string());
        let config = Config::from_sources(SettingsFile::default(), env, Overrides::default());
        assert!(config.voice.openai_api_key.is_none());
    }

    #[test]
    fn provider_names_parse() {
        assert_eq!(TtsProviderKind::parse("OpenAI"), Some(TtsProviderKind::OpenAI));
        assert_eq!(TtsProviderKind::parse(" gtts "), Some(TtsProviderKind::Google));
        assert_eq!(TtsProviderKind::parse("festival"), None);
    }
}
