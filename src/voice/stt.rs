//! Speech-to-text (STT) processing

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Response from a Whisper-compatible transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes speech to text via a Whisper-compatible endpoint
pub struct SpeechToText {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    language: String,
}

impl SpeechToText {
    /// Create a new STT instance
    ///
    /// # Errors
    ///
    /// Returns error if API key is blank or the HTTP client cannot be built
    pub fn new(
        endpoint: String,
        api_key: SecretString,
        model: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
            language,
        })
    }

    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio` - WAV audio bytes
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service rejects it
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

/// Normalize a transcript into the lowercase answer text
///
/// Whisper punctuates ("Me.") where the classic recognizer didn't, so
/// trailing punctuation is stripped.
#[must_use]
pub fn normalize_transcript(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        let result = SpeechToText::new(
            "http://localhost".to_string(),
            SecretString::from(" ".to_string()),
            "whisper-1".to_string(),
            "en".to_string(),
            Duration::from_secs(30),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn transcripts_are_lowercased_without_trailing_punctuation() {
        assert_eq!(normalize_transcript(" Me. "), "me");
        assert_eq!(normalize_transcript("YOU!"), "you");
        assert_eq!(normalize_transcript("Yeah, sure?"), "yeah, sure");
        assert_eq!(normalize_transcript(""), "");
    }
}
