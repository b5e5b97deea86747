//! API key persistence (`config.json`)

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{persistence, read_document, write_document};
use crate::Result;

/// The bearer token for the question service
///
/// Never empty. `Debug` output is redacted.
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw key, trimming whitespace
    ///
    /// Returns `None` for a blank key.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(trimmed.to_string())))
    }

    /// The raw key, for the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Key with everything but the ends hidden, e.g. `sk-or...3f9a1`
    #[must_use]
    pub fn masked(&self) -> String {
        let key = self.expose();
        let chars: Vec<char> = key.chars().collect();
        if chars.len() > 10 {
            let head: String = chars[..5].iter().collect();
            let tail: String = chars[chars.len() - 5..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// On-disk shape of the credential document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialDocument {
    #[serde(default)]
    api_key: String,
}

/// Loads and saves the credential document
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
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

    /// Load the stored key
    ///
    /// A missing file, missing field, or blank key yields `None`. Read and
    /// parse errors are logged and also yield `None`.
    #[must_use]
    pub fn load(&self) -> Option<Credential> {
        match self.try_load() {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "Error loading config");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Credential>> {
        let Some(contents) = read_document(&self.path)? else {
            return Ok(None);
        };
        let document: CredentialDocument =
            serde_json::from_str(&contents).map_err(|e| persistence(&self.path, &e))?;
        Ok(Credential::new(&document.api_key))
    }

    /// Overwrite the document with `credential`
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be serialized or written
    pub fn save(&self, credential: &Credential) -> Result<()> {
        let document = CredentialDocument {
            api_key: credential.expose().to_string(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        write_document(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }
}
