//! Shared test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use you_or_me::menu::Prompter;
use you_or_me::{
    Credential, CredentialStore, Error, FavoritesStore, GenerateFailure, ListenFailure,
    QuestionSource, Result, Session, VoiceIo,
};

/// The question used throughout the game tests
pub const SHOWER_QUESTION: &str = "Who is more likely to sing in the shower?";

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    format!("http://{addr}")
}

/// Question source that always gives the same answer
pub struct FakeQuestions {
    result: std::result::Result<String, GenerateFailure>,
    calls: Arc<AtomicUsize>,
}

impl FakeQuestions {
    /// Always produce `question`
    pub fn returning(question: &str) -> (Self, Arc<AtomicUsize>) {
        Self::with_result(Ok(question.to_string()))
    }

    /// Always fail with `failure`
    pub fn failing(failure: GenerateFailure) -> (Self, Arc<AtomicUsize>) {
        Self::with_result(Err(failure))
    }

    fn with_result(
        result: std::result::Result<String, GenerateFailure>,
    ) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                result,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl QuestionSource for FakeQuestions {
    async fn generate(
        &self,
        credential: Option<&Credential>,
    ) -> std::result::Result<String, GenerateFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credential.is_none() {
            return Err(GenerateFailure::NoCredential);
        }
        self.result.clone()
    }
}

/// Everything a [`FakeVoice`] was asked to do
#[derive(Debug, Default)]
pub struct VoiceLog {
    pub spoken: Vec<String>,
    pub listens: usize,
}

impl VoiceLog {
    pub fn said(&self, text: &str) -> bool {
        self.spoken.iter().any(|s| s == text)
    }
}

/// Voice that replays scripted answers; runs out into timeouts
pub struct FakeVoice {
    answers: VecDeque<std::result::Result<String, ListenFailure>>,
    log: Arc<Mutex<VoiceLog>>,
}

impl FakeVoice {
    pub fn new(answers: &[&str]) -> (Self, Arc<Mutex<VoiceLog>>) {
        Self::scripted(answers.iter().map(|a| Ok((*a).to_string())).collect())
    }

    pub fn scripted(
        answers: Vec<std::result::Result<String, ListenFailure>>,
    ) -> (Self, Arc<Mutex<VoiceLog>>) {
        let log = Arc::new(Mutex::new(VoiceLog::default()));
        (
            Self {
                answers: answers.into(),
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

#[async_trait]
impl VoiceIo for FakeVoice {
    async fn speak(&mut self, text: &str) {
        self.log.lock().unwrap().spoken.push(text.to_string());
    }

    async fn listen(
        &mut self,
        _timeout: Duration,
        _calibration: Duration,
    ) -> std::result::Result<String, ListenFailure> {
        self.log.lock().unwrap().listens += 1;
        self.answers
            .pop_front()
            .unwrap_or(Err(ListenFailure::Timeout))
    }
}

/// Console input read from a script
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub choices: VecDeque<String>,
    pub confirms: VecDeque<bool>,
    pub keys: VecDeque<String>,
    pub choice_calls: usize,
}

impl ScriptedPrompter {
    pub fn with_choices(choices: &[&str]) -> Self {
        Self {
            choices: choices.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.keys.push_back(key.to_string());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn choice(&mut self) -> Result<String> {
        self.choice_calls += 1;
        self.choices
            .pop_front()
            .ok_or_else(|| Error::Prompt("no more scripted choices".to_string()))
    }

    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        self.confirms
            .pop_front()
            .ok_or_else(|| Error::Prompt("no more scripted confirms".to_string()))
    }

    fn input_key(&mut self) -> Result<String> {
        self.keys
            .pop_front()
            .ok_or_else(|| Error::Prompt("no more scripted keys".to_string()))
    }
}

/// Credential document path inside `dir`
pub fn credential_path(dir: &Path) -> std::path::PathBuf {
    dir.join("config.json")
}

/// Favorites document path inside `dir`
pub fn favorites_path(dir: &Path) -> std::path::PathBuf {
    dir.join("favorites.json")
}

/// Store `key` as the saved credential in `dir`
pub fn save_key(dir: &Path, key: &str) {
    CredentialStore::new(credential_path(dir))
        .save(&Credential::new(key).expect("blank test key"))
        .expect("failed to save test key");
}

/// Build a session backed by documents in `dir`
pub fn session_in(
    dir: &Path,
    questions: FakeQuestions,
    voice: FakeVoice,
) -> Session {
    Session::new(
        Box::new(questions),
        Box::new(voice),
        CredentialStore::new(credential_path(dir)),
        FavoritesStore::new(favorites_path(dir)),
    )
    .with_listen_timing(Duration::from_millis(10), Duration::ZERO)
}
