//! Voice processing module
//!
//! Handles audio capture, utterance endpointing, STT, TTS, and playback.
//! The game only sees the [`VoiceIo`] trait.

mod audio;
mod capture;
mod console;
mod playback;
mod stt;
mod tts;
mod utterance;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ListenFailure;

pub use audio::AudioVoice;
pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use console::ConsoleVoice;
pub use playback::{AudioPlayback, decode_mp3};
pub use stt::{SpeechToText, normalize_transcript};
pub use tts::{TextToSpeech, split_for_tts};
pub use utterance::{ENERGY_THRESHOLD, UtteranceDetector, UtteranceState, calculate_energy};

/// Talking to and hearing from the player
#[async_trait]
pub trait VoiceIo: Send {
    /// Say `text` out loud, printing it if speech fails
    async fn speak(&mut self, text: &str);

    /// Hear one answer
    ///
    /// Calibrates for `calibration`, then waits up to `timeout` for the
    /// player to start talking.
    ///
    /// # Errors
    ///
    /// Returns why no usable text was heard
    async fn listen(
        &mut self,
        timeout: Duration,
        calibration: Duration,
    ) -> Result<String, ListenFailure>;
}
