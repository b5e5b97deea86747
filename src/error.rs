//! Error types for the You or Me? game

use thiserror::Error;

/// Result type alias for game operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside a single round
///
/// Round-level failures (question generation, listening) have their own
/// reason enums: [`GenerateFailure`] and [`ListenFailure`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing a persisted document failed
    #[error("persistence error ({path}): {reason}")]
    Persistence {
        /// Document that failed
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Interactive prompt error
    #[error("prompt error: {0}")]
    Prompt(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// Why a question could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateFailure {
    /// No API key has been set up
    #[error("API key not set. Please set up your API key first.")]
    NoCredential,

    /// The service answered with a non-success status
    #[error("Error: {status} - {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The service answered 200 but the payload held no usable question
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request never completed (connect failure, timeout)
    #[error("Error generating question: {0}")]
    Transport(String),
}

/// Why listening produced no usable text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenFailure {
    /// Nobody spoke before the timeout
    #[error("No speech detected. Please try again.")]
    Timeout,

    /// Speech was captured but could not be turned into words
    #[error("Could not understand audio. Please try again.")]
    Unrecognized,

    /// The recognition service failed
    #[error("Could not request results; {0}")]
    RecognitionService(String),

    /// The capture device failed
    #[error("Error in speech recognition: {0}")]
    Device(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_shows_status_and_body() {
        let failure = GenerateFailure::Remote {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(failure.to_string(), "Error: 401 - unauthorized");
    }

    #[test]
    fn listen_failures_have_distinct_messages() {
        let messages = [
            ListenFailure::Timeout.to_string(),
            ListenFailure::Unrecognized.to_string(),
            ListenFailure::RecognitionService("quota".to_string()).to_string(),
            ListenFailure::Device("no mic".to_string()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
