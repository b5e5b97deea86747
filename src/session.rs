//! Game state for one run and the round flow
//!
//! A round goes generate, speak, listen, score, then offer to favorite.
//! Every failure along the way ends the round quietly with a
//! [`RoundOutcome`] describing what happened; nothing here is fatal.

use std::fmt;
use std::time::Duration;

use crate::error::{GenerateFailure, ListenFailure};
use crate::question::QuestionSource;
use crate::store::{Credential, CredentialStore, FavoriteList, FavoritesStore};
use crate::voice::VoiceIo;
use crate::Result;

/// Said after an answer that is neither "you" nor "me"
pub const INVALID_ANSWER: &str = "Invalid answer. Please say 'You' or 'Me'.";

/// Printed before asking whether to keep the question
const FAVORITE_PROMPT: &str = "Do you want to add this question to favorites? (yes/no)";

/// Spoken version of [`FAVORITE_PROMPT`]
const FAVORITE_PROMPT_SPOKEN: &str =
    "Do you want to add this question to favorites? Say yes or no.";

const ALREADY_FAVORITE: &str = "Question already in favorites.";

/// Answers that accept the favorite offer
const AFFIRMATIVE: [&str; 4] = ["yes", "yeah", "yep", "sure"];

/// Default wait for the player to start talking
const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default ambient-noise sampling before listening
const DEFAULT_CALIBRATION: Duration = Duration::from_secs(1);

/// The two possible answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// "You"
    You,
    /// "Me"
    Me,
}

impl Pick {
    /// Match an answer exactly, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse(answer: &str) -> Option<Self> {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("you") {
            Some(Self::You)
        } else if answer.eq_ignore_ascii_case("me") {
            Some(Self::Me)
        } else {
            None
        }
    }

    /// Result line for a scored answer
    #[must_use]
    pub const fn result_message(self) -> &'static str {
        match self {
            Self::You => "You chose 'You'! One point for 'You'.",
            Self::Me => "You chose 'Me'! One point for 'Me'.",
        }
    }
}

/// Running "You" and "Me" counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    you: u32,
    me: u32,
}

impl Scoreboard {
    /// Add one point for `pick`
    pub const fn record(&mut self, pick: Pick) {
        match pick {
            Pick::You => self.you = self.you.saturating_add(1),
            Pick::Me => self.me = self.me.saturating_add(1),
        }
    }

    /// Back to 0-0
    pub const fn reset(&mut self) {
        self.you = 0;
        self.me = 0;
    }

    /// Points for "You"
    #[must_use]
    pub const fn you(&self) -> u32 {
        self.you
    }

    /// Points for "Me"
    #[must_use]
    pub const fn me(&self) -> u32 {
        self.me
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Current Score - You: {}, Me: {}", self.you, self.me)
    }
}

/// What happened when the player was offered the question as a favorite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    /// Said something other than yes, or nothing at all
    Declined,
    /// Added and saved
    Added,
    /// Accepted, but the question was already a favorite
    AlreadyPresent,
}

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No question could be generated; nothing was said or heard
    NotPlayed(GenerateFailure),
    /// The question was asked but no answer was heard
    NoAnswer {
        /// The question asked
        question: String,
        /// Why nothing usable was heard
        reason: ListenFailure,
    },
    /// The answer was neither "you" nor "me"
    Invalid {
        /// The question asked
        question: String,
        /// What was heard
        answer: String,
    },
    /// A point was scored
    Scored {
        /// The question asked
        question: String,
        /// Who got the point
        pick: Pick,
        /// Result of the favorite offer
        favorite: FavoriteOutcome,
    },
}

/// In-memory game state for one process run
pub struct Session {
    credential: Option<Credential>,
    credential_store: CredentialStore,
    favorites: FavoriteList,
    favorites_store: FavoritesStore,
    asked: Vec<String>,
    scores: Scoreboard,
    questions: Box<dyn QuestionSource>,
    voice: Box<dyn VoiceIo>,
    listen_timeout: Duration,
    calibration: Duration,
}

impl Session {
    /// Start a session, loading the credential and favorites from disk
    #[must_use]
    pub fn new(
        questions: Box<dyn QuestionSource>,
        voice: Box<dyn VoiceIo>,
        credential_store: CredentialStore,
        favorites_store: FavoritesStore,
    ) -> Self {
        let credential = credential_store.load();
        let favorites = favorites_store.load();

        tracing::debug!(
            has_credential = credential.is_some(),
            favorites = favorites.len(),
            "session started"
        );

        Self {
            credential,
            credential_store,
            favorites,
            favorites_store,
            asked: Vec::new(),
            scores: Scoreboard::default(),
            questions,
            voice,
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
            calibration: DEFAULT_CALIBRATION,
        }
    }

    /// Set how long listening waits and calibrates
    #[must_use]
    pub fn with_listen_timing(mut self, timeout: Duration, calibration: Duration) -> Self {
        self.listen_timeout = timeout;
        self.calibration = calibration;
        self
    }

    /// Play one round
    pub async fn play_round(&mut self) -> RoundOutcome {
        let question = match self.questions.generate(self.credential.as_ref()).await {
            Ok(question) => question,
            Err(failure) => {
                report_generate_failure(&failure);
                return RoundOutcome::NotPlayed(failure);
            }
        };
        self.asked.push(question.clone());

        println!("\n{question}");
        self.voice.speak(&question).await;

        self.say("Say 'You' or 'Me'...").await;
        let answer = match self.hear().await {
            Ok(answer) => answer,
            Err(reason) => return RoundOutcome::NoAnswer { question, reason },
        };

        let Some(pick) = Pick::parse(&answer) else {
            tracing::debug!(answer = %answer, "answer not scored");
            self.say(INVALID_ANSWER).await;
            return RoundOutcome::Invalid { question, answer };
        };

        self.scores.record(pick);
        tracing::info!(?pick, you = self.scores.you(), me = self.scores.me(), "point scored");
        self.say(pick.result_message()).await;

        let favorite = self.offer_favorite(&question).await;
        RoundOutcome::Scored {
            question,
            pick,
            favorite,
        }
    }

    /// Ask whether to keep `question`, and keep it on a yes
    async fn offer_favorite(&mut self, question: &str) -> FavoriteOutcome {
        println!("\n{FAVORITE_PROMPT}");
        self.voice.speak(FAVORITE_PROMPT_SPOKEN).await;

        match self.hear().await {
            Ok(reply) if is_affirmative(&reply) => {}
            _ => return FavoriteOutcome::Declined,
        }

        let outcome = self.add_favorite(question);
        match outcome {
            FavoriteOutcome::Added => self.voice.speak("Added to favorites.").await,
            FavoriteOutcome::AlreadyPresent => self.voice.speak(ALREADY_FAVORITE).await,
            FavoriteOutcome::Declined => {}
        }
        outcome
    }

    /// Listen once, printing the reason if nothing usable came back
    async fn hear(&mut self) -> std::result::Result<String, ListenFailure> {
        let heard = self.voice.listen(self.listen_timeout, self.calibration).await;
        if let Err(reason) = &heard {
            match reason {
                ListenFailure::Timeout => tracing::info!("listen timed out"),
                ListenFailure::Unrecognized => tracing::info!("speech not recognized"),
                ListenFailure::RecognitionService(e) => {
                    tracing::warn!(error = %e, "recognition service failed");
                }
                ListenFailure::Device(e) => tracing::warn!(error = %e, "audio device failed"),
            }
            println!("{reason}");
        }
        heard
    }

    /// Add `question` to favorites and save the list
    ///
    /// A failed save is logged; the question stays a favorite for this run.
    pub fn add_favorite(&mut self, question: &str) -> FavoriteOutcome {
        if !self.favorites.insert(question) {
            println!("{ALREADY_FAVORITE}");
            return FavoriteOutcome::AlreadyPresent;
        }

        match self.favorites_store.save(&self.favorites) {
            Ok(()) => tracing::debug!(count = self.favorites.len(), "favorites saved"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to save favorites");
                println!("Error saving favorites: {e}");
            }
        }
        println!("Added to favorites: {question}");
        FavoriteOutcome::Added
    }

    /// Print `text` and speak it
    pub async fn say(&mut self, text: &str) {
        println!("{text}");
        self.voice.speak(text).await;
    }

    /// Speak without printing
    pub async fn speak(&mut self, text: &str) {
        self.voice.speak(text).await;
    }

    /// Score line, e.g. `Current Score - You: 1, Me: 0`
    #[must_use]
    pub fn display_score(&self) -> String {
        self.scores.to_string()
    }

    /// Zero both counters
    pub fn reset_score(&mut self) -> String {
        self.scores.reset();
        "Score has been reset.".to_string()
    }

    /// Numbered favorites under a heading, or a note that there are none
    #[must_use]
    pub fn display_favorites(&self) -> String {
        if self.favorites.is_empty() {
            return "You don't have any favorite questions yet.".to_string();
        }

        let lines: Vec<String> = self
            .favorites
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, question)| format!("{}. {question}", i + 1))
            .collect();
        format!("\n=== Your Favorite Questions ===\n{}", lines.join("\n"))
    }

    /// Replace the credential and save it straight away
    ///
    /// The new key is kept in memory even if saving fails.
    ///
    /// # Errors
    ///
    /// Returns error if the credential document cannot be written
    pub fn set_credential(&mut self, credential: Credential) -> Result<()> {
        let saved = self.credential_store.save(&credential);
        self.credential = Some(credential);
        saved
    }

    /// Current credential, if any
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Current scores
    #[must_use]
    pub const fn scores(&self) -> Scoreboard {
        self.scores
    }

    /// Favorites, in the order they were added
    #[must_use]
    pub const fn favorites(&self) -> &FavoriteList {
        &self.favorites
    }

    /// Every question generated this run, oldest first
    #[must_use]
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

fn report_generate_failure(failure: &GenerateFailure) {
    tracing::warn!(error = %failure, "no question this round");
    println!("{failure}");
    if *failure == GenerateFailure::NoCredential {
        println!("Choose option 5 from the menu to set up your API key.");
    }
}

fn is_affirmative(reply: &str) -> bool {
    let reply = reply.trim().to_lowercase();
    AFFIRMATIVE.contains(&reply.as_str())
}
