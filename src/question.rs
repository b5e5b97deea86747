//! "You or Me?" question generation via a chat-completions endpoint

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::QuestionConfig;
use crate::error::GenerateFailure;
use crate::store::Credential;
use crate::Result;

/// Instruction that shapes every generated question
pub const SYSTEM_PROMPT: &str = "You are a fun game assistant that generates 'You or Me?' \
questions. These are questions that ask the player to choose between themselves or another \
person based on various scenarios, traits, or preferences. Generate a single, concise question \
in the format 'Who is more likely to...' or 'Who would rather...' Make it fun, creative, and \
appropriate for all ages.";

/// The per-request ask
pub const USER_PROMPT: &str = "Generate a 'You or Me?' question.";

/// Something that can come up with a question
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Produce one fresh question
    ///
    /// # Errors
    ///
    /// Returns the reason no question was produced. Without a credential
    /// this is [`GenerateFailure::NoCredential`] and nothing is sent.
    async fn generate(
        &self,
        credential: Option<&Credential>,
    ) -> std::result::Result<String, GenerateFailure>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Asks an OpenAI-compatible chat endpoint (`OpenRouter` by default)
pub struct QuestionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl QuestionClient {
    /// Create a client from settings
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &QuestionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        tracing::debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout_secs = config.request_timeout.as_secs(),
            "question client initialized"
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl QuestionSource for QuestionClient {
    async fn generate(
        &self,
        credential: Option<&Credential>,
    ) -> std::result::Result<String, GenerateFailure> {
        let Some(credential) = credential else {
            return Err(GenerateFailure::NoCredential);
        };

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: USER_PROMPT,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "question request failed");
                GenerateFailure::Transport(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read question response");
            GenerateFailure::Transport(e.to_string())
        })?;

        if status != StatusCode::OK {
            tracing::error!(status = %status, body = %body, "question API error");
            return Err(GenerateFailure::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let question = extract_question(&body)?;
        tracing::info!(question = %question, "question generated");
        Ok(question)
    }
}

/// Pull the trimmed question text out of a chat-completions body
///
/// # Errors
///
/// Returns [`GenerateFailure::Malformed`] if the body isn't a completion or
/// the first choice holds no text
pub fn extract_question(body: &str) -> std::result::Result<String, GenerateFailure> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerateFailure::Malformed(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerateFailure::Malformed("no choices in response".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let question = content.trim();
    if question.is_empty() {
        return Err(GenerateFailure::Malformed("empty question".to_string()));
    }
    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn extracts_and_trims_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Who would rather skydive?\n"}}]}"#;
        assert_eq!(extract_question(body).unwrap(), "Who would rather skydive?");
    }

    #[test]
    fn missing_choices_is_malformed() {
        assert!(matches!(
            extract_question(r#"{"choices":[]}"#),
            Err(GenerateFailure::Malformed(_))
        ));
        assert!(matches!(
            extract_question("<html>oops</html>"),
            Err(GenerateFailure::Malformed(_))
        ));
    }

    #[test]
    fn blank_content_is_malformed() {
        let body = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        assert!(matches!(
            extract_question(body),
            Err(GenerateFailure::Malformed(_))
        ));
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert!(matches!(
            extract_question(body),
            Err(GenerateFailure::Malformed(_))
        ));
    }

    #[test]
    fn request_body_names_model_and_prompts() {
        let request = ChatRequest {
            model: "openai/gpt-3.5-turbo",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: USER_PROMPT,
                },
            ],
            max_tokens: 100,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "openai/gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], USER_PROMPT);
    }

    #[tokio::test]
    async fn no_credential_skips_the_network() {
        // Port 9 (discard) would refuse or hang; NoCredential must come first
        let client = QuestionClient::new(&QuestionConfig {
            model: "m".to_string(),
            endpoint: "http://127.0.0.1:9/unused".to_string(),
            max_tokens: 100,
            request_timeout: Duration::from_millis(50),
        })
        .unwrap();
        assert_eq!(
            client.generate(None).await,
            Err(GenerateFailure::NoCredential)
        );
    }
}
