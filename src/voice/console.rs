//! Keyboard stand-in for the microphone (`--typed`)

use std::time::Duration;

use async_trait::async_trait;
use dialoguer::Input;

use super::VoiceIo;
use crate::error::ListenFailure;

/// Reads answers from the terminal and keeps quiet instead of speaking
///
/// Everything the game says is already printed before it is spoken, so
/// `speak` has nothing left to do.
#[derive(Debug, Default)]
pub struct ConsoleVoice;

impl ConsoleVoice {
    /// Create a console voice
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VoiceIo for ConsoleVoice {
    async fn speak(&mut self, text: &str) {
        tracing::trace!(text, "typed mode, not speaking");
    }

    async fn listen(
        &mut self,
        _timeout: Duration,
        _calibration: Duration,
    ) -> Result<String, ListenFailure> {
        read_typed_answer()
    }
}

/// Read one answer line from the terminal
///
/// No timeout applies: the game simply waits for Enter. A blank line is
/// [`ListenFailure::Unrecognized`].
pub(crate) fn read_typed_answer() -> Result<String, ListenFailure> {
    let line: String = Input::new()
        .with_prompt("Your answer")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ListenFailure::Device(e.to_string()))?;

    normalize_typed(&line)
}

fn normalize_typed(line: &str) -> Result<String, ListenFailure> {
    let answer = line.trim().to_lowercase();
    if answer.is_empty() {
        return Err(ListenFailure::Unrecognized);
    }
    Ok(answer)
}
