//! Persisted session state
//!
//! The engine treats captured authentication state as an opaque, ordered list
//! of cookie records: it is captured from a browsing surface after a successful
//! sign-in and replayed verbatim at the next start. Nothing here inspects
//! cookie contents.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while persisting or loading session state
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One captured cookie record.
///
/// Mirrors what the CDP layer reports; optional attributes survive the
/// round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<f64>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
}

/// Durable storage for the captured cookie set.
///
/// Backed by a single JSON file. `load` after `save` returns an equal blob;
/// an absent file loads as `None`, and an unreadable one is treated the same
/// way (replay of stale state is validated downstream anyway).
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persists the cookie set, replacing any previous one.
    pub fn save(&self, cookies: &[Cookie]) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(
            "Persisted {} session cookies to {}",
            cookies.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Loads the persisted cookie set, if any.
    pub fn load(&self) -> Result<Option<Vec<Cookie>>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Vec<Cookie>>(&content) {
            Ok(cookies) => Ok(Some(cookies)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }
}
