//! Browsing surfaces and HTML extraction
//!
//! This module contains the browser-facing half of the engine:
//! - The [`Surface`] trait, the narrow interface every other component drives
//! - A Chromium (CDP) implementation of that trait
//! - Ordered first-match-wins selector chains over HTML snapshots

mod chrome;
mod select;

pub use chrome::{ChromeSurface, LaunchOptions};
pub use select::{attr_of, SelectorChain};

use crate::session::Cookie;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving a browsing surface
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Browsing surface is closed")]
    Closed,
}

/// Result type for surface operations
pub type BrowseResult<T> = std::result::Result<T, BrowseError>;

/// An isolated browsing surface.
///
/// Exactly two implementors matter: the Chromium-backed surface used in
/// production and scripted fakes used in tests. Element-addressing methods
/// return `Ok(false)` when the selector matches nothing; only transport-level
/// failures are errors.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Navigate to a URL.
    async fn goto(&self, url: &str) -> BrowseResult<()>;

    /// Address of the surface after the most recent navigation.
    async fn current_url(&self) -> BrowseResult<String>;

    /// Full HTML snapshot of the current document.
    async fn content(&self) -> BrowseResult<String>;

    /// Click the first element matching `selector`. Returns whether a match
    /// existed.
    async fn click(&self, selector: &str) -> BrowseResult<bool>;

    /// Click the `index`-th element matching `selector`.
    async fn click_nth(&self, selector: &str, index: usize) -> BrowseResult<bool>;

    /// Focus the first element matching `selector` and type `text` into it.
    async fn type_text(&self, selector: &str, text: &str) -> BrowseResult<bool>;

    /// Wait up to `timeout` for `selector` to match, polling. Returns whether
    /// it matched before the deadline.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowseResult<bool>;

    /// Capture the current cookie set.
    async fn cookies(&self) -> BrowseResult<Vec<Cookie>>;

    /// Replay a previously captured cookie set into this surface.
    async fn set_cookies(&self, cookies: Vec<Cookie>) -> BrowseResult<()>;

    /// If a second tab/window has been opened on this surface, return its URL
    /// and close it. `None` when only the main document is open.
    async fn popup_url(&self) -> BrowseResult<Option<String>>;

    /// Navigate back in history.
    async fn back(&self) -> BrowseResult<()>;

    /// Tear the surface down. In-flight operations on the surface fail once
    /// this completes.
    async fn close(&self) -> BrowseResult<()>;
}
