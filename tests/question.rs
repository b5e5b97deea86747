//! Question generator tests against a local chat-completions server

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use you_or_me::config::QuestionConfig;
use you_or_me::question::{SYSTEM_PROMPT, USER_PROMPT};
use you_or_me::{Credential, GenerateFailure, QuestionClient, QuestionSource};

mod common;
use common::{SHOWER_QUESTION, spawn_server};

/// What the fake endpoint saw
#[derive(Default)]
struct Seen {
    authorization: Option<String>,
    body: Option<Value>,
}

type SeenState = Arc<Mutex<Seen>>;

fn client_for(endpoint: String) -> QuestionClient {
    QuestionClient::new(&QuestionConfig {
        model: "openai/gpt-3.5-turbo".to_string(),
        endpoint,
        max_tokens: 100,
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn key() -> Credential {
    Credential::new("abc123").unwrap()
}

/// Serve one fixed reply at `/chat/completions`, recording the request
async fn serve(status: StatusCode, reply: &'static str) -> (String, SeenState) {
    let seen = SeenState::default();
    let app = Router::new()
        .route(
            "/chat/completions",
            post(
                move |State(seen): State<SeenState>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.authorization = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(ToString::to_string);
                    seen.body = Some(body);
                    (status, reply)
                },
            ),
        )
        .with_state(Arc::clone(&seen));

    let base = spawn_server(app).await;
    (format!("{base}/chat/completions"), seen)
}

#[tokio::test]
async fn test_success_returns_trimmed_question() {
    let reply = r#"{"choices":[{"message":{"role":"assistant","content":"\n Who is more likely to sing in the shower? "}}]}"#;
    let (endpoint, seen) = serve(StatusCode::OK, reply).await;

    let question = client_for(endpoint).generate(Some(&key())).await;
    assert_eq!(question.as_deref(), Ok(SHOWER_QUESTION));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer abc123"));

    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["model"], "openai/gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 100);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": USER_PROMPT},
        ])
    );
}

#[tokio::test]
async fn test_non_200_is_remote_failure_with_body() {
    let (endpoint, _) = serve(StatusCode::UNAUTHORIZED, "invalid key").await;

    let failure = client_for(endpoint).generate(Some(&key())).await.unwrap_err();
    assert_eq!(
        failure,
        GenerateFailure::Remote {
            status: 401,
            body: "invalid key".to_string(),
        }
    );
    assert_eq!(failure.to_string(), "Error: 401 - invalid key");
}

#[tokio::test]
async fn test_unparseable_200_is_malformed() {
    let (endpoint, _) = serve(StatusCode::OK, "<html>surprise</html>").await;

    let failure = client_for(endpoint).generate(Some(&key())).await.unwrap_err();
    assert!(matches!(failure, GenerateFailure::Malformed(_)));
}

#[tokio::test]
async fn test_blank_content_is_malformed() {
    let (endpoint, _) = serve(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"   "}}]}"#,
    )
    .await;

    let failure = client_for(endpoint).generate(Some(&key())).await.unwrap_err();
    assert!(matches!(failure, GenerateFailure::Malformed(_)));
}

#[tokio::test]
async fn test_refused_connection_is_transport_failure() {
    // Grab a free port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let failure = client_for(format!("http://{addr}/chat/completions"))
        .generate(Some(&key()))
        .await
        .unwrap_err();
    assert!(matches!(failure, GenerateFailure::Transport(_)));
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let (endpoint, seen) = serve(StatusCode::OK, "{}").await;

    let failure = client_for(endpoint).generate(None).await.unwrap_err();
    assert_eq!(failure, GenerateFailure::NoCredential);
    assert!(seen.lock().unwrap().body.is_none());
}
