//! Microphone and speaker voice for normal play

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::capture::{AudioCapture, samples_to_wav};
use super::console::read_typed_answer;
use super::playback::AudioPlayback;
use super::stt::{SpeechToText, normalize_transcript};
use super::tts::TextToSpeech;
use super::VoiceIo;
use crate::config::VoiceConfig;
use crate::error::ListenFailure;
use crate::{Error, Result};

/// Speaks through the default output and listens on the default microphone
pub struct AudioVoice {
    tts: TextToSpeech,
    stt: Option<SpeechToText>,
}

impl AudioVoice {
    /// Build from voice settings
    ///
    /// Without an `OpenAI` key there is no transcription, and `listen`
    /// reads a typed answer instead.
    ///
    /// # Errors
    ///
    /// Returns error if the TTS HTTP client cannot be built
    pub fn from_config(config: &VoiceConfig) -> Result<Self> {
        let stt = config.openai_api_key.as_ref().and_then(|key| {
            SpeechToText::new(
                config.stt_endpoint.clone(),
                SecretString::from(key.expose_secret().to_owned()),
                config.stt_model.clone(),
                config.language.clone(),
                config.request_timeout,
            )
            .inspect_err(|e| tracing::warn!(error = %e, "speech recognition unavailable"))
            .ok()
        });

        if stt.is_none() {
            tracing::info!("no transcription key, answers will be typed");
        }

        Ok(Self {
            tts: TextToSpeech::from_config(config)?,
            stt,
        })
    }

    /// Synthesize `text`, stage it in a temporary MP3, and play it
    async fn try_speak(&self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;

        // Removed when the guard drops, whatever happens below
        let mut file = tempfile::Builder::new()
            .prefix("youorme-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(&audio)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3_file(&path))
            .await
            .map_err(|e| Error::Audio(e.to_string()))??;

        drop(file);
        Ok(())
    }
}

#[async_trait]
impl VoiceIo for AudioVoice {
    async fn speak(&mut self, text: &str) {
        if let Err(e) = self.try_speak(text).await {
            tracing::warn!(error = %e, "text-to-speech failed, printing instead");
            println!("{text}");
        }
    }

    async fn listen(
        &mut self,
        timeout: Duration,
        calibration: Duration,
    ) -> std::result::Result<String, ListenFailure> {
        let Some(stt) = &self.stt else {
            return read_typed_answer();
        };

        println!("Listening...");
        let (samples, sample_rate) = tokio::task::spawn_blocking(move || {
            let mut capture =
                AudioCapture::new().map_err(|e| ListenFailure::Device(e.to_string()))?;
            let samples = capture.capture_utterance(timeout, calibration)?;
            Ok::<_, ListenFailure>((samples, capture.sample_rate()))
        })
        .await
        .map_err(|e| ListenFailure::Device(e.to_string()))??;

        println!("Processing...");
        let wav =
            samples_to_wav(&samples, sample_rate).map_err(|e| ListenFailure::Device(e.to_string()))?;

        let transcript = stt
            .transcribe(wav)
            .await
            .map_err(|e| ListenFailure::RecognitionService(e.to_string()))?;

        if transcript.trim().is_empty() {
            return Err(ListenFailure::Unrecognized);
        }

        println!("You said: {}", transcript.trim());
        Ok(normalize_transcript(&transcript))
    }
}
