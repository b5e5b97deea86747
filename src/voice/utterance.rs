//! Utterance endpointing
//!
//! Finds one spoken phrase in a stream of microphone chunks using RMS energy:
//! wait for speech, accumulate it, and call it done after a stretch of
//! trailing silence. The threshold can be raised above the room's ambient
//! level with [`UtteranceDetector::calibrate`].

/// Floor for the speech energy threshold
pub const ENERGY_THRESHOLD: f32 = 0.03;

/// Calibrated threshold is this many times the ambient RMS
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Minimum speech before an utterance counts (seconds)
const MIN_SPEECH_SECS: f32 = 0.2;

/// Trailing silence that ends an utterance (seconds)
const PAUSE_SECS: f32 = 0.8;

/// Hard cap on a single utterance (seconds)
const MAX_PHRASE_SECS: f32 = 10.0;

/// Where the detector is in the current phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// Speech followed by enough silence (or the phrase cap was hit)
    Complete,
}

/// Detects the start and end of one utterance
#[derive(Debug)]
pub struct UtteranceDetector {
    threshold: f32,
    min_speech_samples: usize,
    pause_samples: usize,
    max_samples: usize,
    state: UtteranceState,
    buffer: Vec<f32>,
    silence_counter: usize,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn seconds_to_samples(secs: f32, sample_rate: u32) -> usize {
    (secs * sample_rate as f32) as usize
}

impl UtteranceDetector {
    /// Create a detector for audio at `sample_rate` Hz
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            threshold: ENERGY_THRESHOLD,
            min_speech_samples: seconds_to_samples(MIN_SPEECH_SECS, sample_rate),
            pause_samples: seconds_to_samples(PAUSE_SECS, sample_rate),
            max_samples: seconds_to_samples(MAX_PHRASE_SECS, sample_rate),
            state: UtteranceState::Waiting,
            buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Raise the threshold above the energy of `ambient` room noise
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let ambient_energy = calculate_energy(ambient);
        self.threshold = (ambient_energy * AMBIENT_MULTIPLIER).max(ENERGY_THRESHOLD);
        tracing::debug!(
            ambient_energy,
            threshold = self.threshold,
            "calibrated for ambient noise"
        );
    }

    /// Feed the next chunk of samples and return the resulting state
    pub fn process(&mut self, samples: &[f32]) -> UtteranceState {
        let energy = calculate_energy(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            UtteranceState::Waiting => {
                if is_speech {
                    self.state = UtteranceState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected");
                }
            }
            UtteranceState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                let spoken = self.buffer.len().saturating_sub(self.silence_counter);
                if self.silence_counter > self.pause_samples {
                    if spoken > self.min_speech_samples {
                        tracing::debug!(samples = self.buffer.len(), "utterance complete");
                        self.state = UtteranceState::Complete;
                    } else {
                        // A click or cough, not an answer
                        tracing::trace!("speech too short, waiting again");
                        self.reset();
                    }
                } else if self.buffer.len() >= self.max_samples {
                    tracing::debug!("phrase limit reached");
                    self.state = UtteranceState::Complete;
                }
            }
            UtteranceState::Complete => {}
        }

        self.state
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> UtteranceState {
        self.state
    }

    /// Active energy threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Samples accumulated for the current utterance
    #[must_use]
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Take the utterance samples and start over
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let samples = std::mem::take(&mut self.buffer);
        self.reset();
        samples
    }

    /// Back to waiting, keeping the calibrated threshold
    pub fn reset(&mut self) {
        self.state = UtteranceState::Waiting;
        self.buffer.clear();
        self.silence_counter = 0;
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
