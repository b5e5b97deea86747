//! Favorite questions persistence (`favorites.json`)

use std::path::{Path, PathBuf};

use super::{persistence, read_document, write_document};
use crate::Result;

/// Ordered favorite questions with no duplicate text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteList {
    questions: Vec<String>,
}

impl FavoriteList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from stored entries, dropping blanks and repeats
    #[must_use]
    pub fn from_questions(questions: Vec<String>) -> Self {
        let mut list = Self::new();
        for question in questions {
            list.insert(&question);
        }
        list
    }

    /// Append `question` unless it is blank or already present
    ///
    /// Returns `true` when the list changed.
    pub fn insert(&mut self, question: &str) -> bool {
        if question.trim().is_empty() || self.contains(question) {
            return false;
        }
        self.questions.push(question.to_string());
        true
    }

    /// Whether the exact text is already a favorite
    #[must_use]
    pub fn contains(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q == question)
    }

    /// Favorites in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.questions
    }

    /// Number of favorites
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether there are no favorites
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Loads and saves the favorites document
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    /// Create a store for the document at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored list, or an empty one if absent or unreadable
    #[must_use]
    pub fn load(&self) -> FavoriteList {
        match self.try_load() {
            Ok(list) => {
                tracing::debug!(count = list.len(), "favorites loaded");
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error loading favorites");
                FavoriteList::new()
            }
        }
    }

    fn try_load(&self) -> Result<FavoriteList> {
        let Some(contents) = read_document(&self.path)? else {
            return Ok(FavoriteList::new());
        };
        let questions: Vec<String> =
            serde_json::from_str(&contents).map_err(|e| persistence(&self.path, &e))?;
        Ok(FavoriteList::from_questions(questions))
    }

    /// Overwrite the document with the full list
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be serialized or written
    pub fn save(&self, favorites: &FavoriteList) -> Result<()> {
        let json = serde_json::to_string_pretty(favorites.as_slice())?;
        write_document(&self.path, &json)?;
        tracing::debug!(count = favorites.len(), "favorites saved");
        Ok(())
    }
}
