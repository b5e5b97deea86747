//! Text-to-speech (TTS) processing

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::{TtsProviderKind, VoiceConfig};
use crate::{Error, Result};

/// Google Translate speech endpoint (what `gTTS` uses)
const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// `OpenAI` speech endpoint
const OPENAI_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Longest chunk the Google endpoint accepts reliably
const GOOGLE_MAX_CHARS: usize = 100;

/// TTS provider backend
enum TtsProvider {
    Google {
        language: String,
    },
    OpenAI {
        api_key: SecretString,
        voice: String,
        model: String,
    },
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a TTS instance using the keyless Google Translate voice
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new_google(language: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            provider: TtsProvider::Google { language },
        })
    }

    /// Create a TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is blank or the HTTP client cannot be built
    pub fn new_openai(
        api_key: SecretString,
        voice: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: http_client(timeout)?,
            provider: TtsProvider::OpenAI {
                api_key,
                voice,
                model,
            },
        })
    }

    /// Build the provider chosen in settings
    ///
    /// `OpenAI` without a key falls back to Google.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &VoiceConfig) -> Result<Self> {
        if config.tts_provider == TtsProviderKind::OpenAI {
            if let Some(key) = &config.openai_api_key {
                match Self::new_openai(
                    SecretString::from(key.expose_secret().to_owned()),
                    config.tts_voice.clone(),
                    config.tts_model.clone(),
                    config.request_timeout,
                ) {
                    Ok(tts) => return Ok(tts),
                    Err(e) => tracing::warn!(error = %e, "falling back to Google TTS"),
                }
            } else {
                tracing::warn!("OpenAI TTS selected without an API key, using Google TTS");
            }
        }
        Self::new_google(config.language.clone(), config.request_timeout)
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::Tts("cannot speak empty text".to_string()));
        }

        match &self.provider {
            TtsProvider::Google { language } => self.synthesize_google(text, language).await,
            TtsProvider::OpenAI {
                api_key,
                voice,
                model,
            } => self.synthesize_openai(text, api_key, voice, model).await,
        }
    }

    /// Synthesize using Google Translate, one request per chunk
    async fn synthesize_google(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_for_tts(text, GOOGLE_MAX_CHARS);
        let total = chunks.len();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx_param = idx.to_string();
            let total_param = total.to_string();
            let textlen = chunk.chars().count().to_string();

            let response = self
                .client
                .get(GOOGLE_TTS_URL)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", language),
                    ("client", "tw-ob"),
                    ("idx", idx_param.as_str()),
                    ("total", total_param.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Tts(format!("Google TTS error {status}: {body}")));
            }

            // MP3 frames concatenate cleanly
            audio.extend_from_slice(&response.bytes().await?);
        }

        tracing::debug!(chunks = total, bytes = audio.len(), "Google TTS complete");
        Ok(audio)
    }

    /// Synthesize using `OpenAI` TTS
    async fn synthesize_openai(
        &self,
        text: &str,
        api_key: &SecretString,
        voice: &str,
        model: &str,
    ) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
        }

        let request = TtsRequest {
            model,
            input: text,
            voice,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(OPENAI_TTS_URL)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Split text into chunks of at most `max_chars`, breaking between words
///
/// A single word longer than `max_chars` is cut mid-word.
#[must_use]
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(i, _)| i);
            chunks.push(word[..cut].to_string());
            word = &word[cut..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(
            split_for_tts("Who is more likely to sing in the shower?", 100),
            vec!["Who is more likely to sing in the shower?"]
        );
    }

    #[test]
    fn long_text_breaks_between_words() {
        let chunks = split_for_tts("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn oversized_word_is_cut() {
        assert_eq!(split_for_tts("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_for_tts("   ", 100).is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_refused_before_any_request() {
        let tts = TextToSpeech::new_google("en".to_string(), Duration::from_secs(5)).unwrap();
        assert!(matches!(tts.synthesize(" ").await, Err(Error::Tts(_))));
    }
}
