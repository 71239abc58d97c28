//! Jobscout: an authenticated job-listing acquisition engine
//!
//! This crate drives a real Chromium browser against LinkedIn to collect job
//! postings for a structured search, maintaining a persisted login session and
//! enriching each listing with organization details fetched by a concurrent
//! background worker.

pub mod browser;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod model;
pub mod search;
pub mod server;
pub mod session;

use thiserror::Error;

/// Main error type for jobscout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowseError),

    #[error("Session store error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Login left the session at an unrecognized address: {url}")]
    AmbiguousAuthState { url: String },

    #[error("Security challenge was not resolved within {seconds}s")]
    ChallengeTimeout { seconds: u64 },

    #[error("Authentication failed; a new engine instance is required to retry")]
    AuthFailed,

    #[error("Engine has been closed")]
    Closed,

    #[error("Organization fetch failed for {org_ref}: {message}")]
    OrgFetch { org_ref: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for jobscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{ChromeSurface, Surface};
pub use config::Config;
pub use engine::JobAcquisitionEngine;
pub use model::{JobRecord, OrgDetails};
pub use search::{build_query, SearchFilters};
pub use session::{AuthState, Cookie, SessionStore};
