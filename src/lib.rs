//! You or Me? - a voice party game with AI-generated questions
//!
//! The player is asked "Who is more likely to..." questions, answers
//! "You" or "Me" out loud (or typed), and keeps a running score. Good
//! questions can be saved as favorites.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Menu loop                        │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                      Session                         │
//! │   Scores  │  Favorites  │  Credential  │  Rounds    │
//! └──────┬──────────────────┬──────────────────┬────────┘
//!        │                  │                  │
//! ┌──────▼──────┐   ┌───────▼───────┐   ┌──────▼──────┐
//! │  Question   │   │    Voice      │   │   Stores    │
//! │  source     │   │  STT / TTS    │   │   (JSON)    │
//! └─────────────┘   └───────────────┘   └─────────────┘
//! ```

pub mod config;
pub mod error;
pub mod menu;
pub mod question;
pub mod session;
pub mod store;
pub mod voice;

pub use config::Config;
pub use error::{Error, GenerateFailure, ListenFailure, Result};
pub use question::{QuestionClient, QuestionSource};
pub use session::{FavoriteOutcome, Pick, RoundOutcome, Scoreboard, Session};
pub use store::{Credential, CredentialStore, FavoriteList, FavoritesStore};
pub use voice::{AudioVoice, ConsoleVoice, VoiceIo};
