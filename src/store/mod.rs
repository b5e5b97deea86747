//! Flat-file persistence for the credential and the favorites list
//!
//! Both documents are small JSON files rewritten wholesale on every change.
//! Load failures never block the game: they are logged and treated as an
//! empty document.

mod credential;
mod favorites;

pub use credential::{Credential, CredentialStore};
pub use favorites::{FavoriteList, FavoritesStore};

use std::path::Path;

use crate::{Error, Result};

/// Read a document, treating a missing or blank file as absent
fn read_document(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "document does not exist");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| persistence(path, &e))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(contents))
}

/// Overwrite a document with `contents`
fn write_document(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| persistence(path, &e))
}

fn persistence(path: &Path, reason: &impl std::fmt::Display) -> Error {
    Error::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
