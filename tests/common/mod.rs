//! Shared test doubles
//!
//! `FakeSurface` is a scripted, in-memory implementation of the `Surface`
//! trait: selector queries run against the current HTML snapshot with real
//! `scraper` parsing, and navigations/clicks swap in pre-registered views.

// Each test binary uses its own subset of these helpers
#![allow(dead_code)]

use async_trait::async_trait;
use jobscout::browser::{BrowseResult, Surface};
use jobscout::model::OrgDetails;
use jobscout::session::Cookie;
use jobscout::ScoutError;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Resulting page state after a scripted transition
#[derive(Debug, Default, Clone)]
pub struct View {
    pub url: Option<String>,
    pub html: Option<String>,
}

impl View {
    pub fn at(url: &str, html: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            html: Some(html.to_string()),
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    pub url: String,
    pub html: String,
    pub cookies: Vec<Cookie>,
    /// URL-prefix → view applied on navigation
    pub on_goto: Vec<(String, View)>,
    /// Selector → view applied when that selector is clicked
    pub on_click: HashMap<String, View>,
    /// (selector, index) → view applied when that element is clicked
    pub on_click_nth: HashMap<(String, usize), View>,
    /// URL of a popup tab the next `popup_url` call will capture
    pub popup: Option<String>,
    // Recorded interactions
    pub visited: Vec<String>,
    pub clicked: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub cookie_replays: usize,
    url_history: Vec<String>,
}

impl FakeState {
    fn apply(&mut self, view: &View) {
        if let Some(url) = &view.url {
            self.url_history.push(self.url.clone());
            self.url = url.clone();
        }
        if let Some(html) = &view.html {
            self.html = html.clone();
        }
    }
}

pub struct FakeSurface {
    state: Mutex<FakeState>,
}

impl FakeSurface {
    pub fn new(configure: impl FnOnce(&mut FakeState)) -> Arc<Self> {
        let mut state = FakeState::default();
        configure(&mut state);
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    /// Reads a value out of the recorded state
    pub fn inspect<R>(&self, read: impl FnOnce(&FakeState) -> R) -> R {
        read(&self.state.lock().unwrap())
    }

    /// Moves the surface to a new address out-of-band, as a human completing
    /// a challenge in the browser would
    pub fn relocate(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
    }

    fn matches(html: &str, selector: &str) -> bool {
        Self::match_count(html, selector) > 0
    }

    fn match_count(html: &str, selector: &str) -> usize {
        match Selector::parse(selector) {
            Ok(sel) => Html::parse_document(html).select(&sel).count(),
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl Surface for FakeSurface {
    async fn goto(&self, url: &str) -> BrowseResult<()> {
        let mut state = self.state.lock().unwrap();
        state.visited.push(url.to_string());
        let view = state
            .on_goto
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, view)| view.clone());
        match view {
            Some(view) => state.apply(&view),
            None => {
                let current = state.url.clone();
                state.url_history.push(current);
                state.url = url.to_string();
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> BrowseResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn content(&self) -> BrowseResult<String> {
        Ok(self.state.lock().unwrap().html.clone())
    }

    async fn click(&self, selector: &str) -> BrowseResult<bool> {
        let mut state = self.state.lock().unwrap();
        if !Self::matches(&state.html, selector) {
            return Ok(false);
        }
        state.clicked.push(selector.to_string());
        if let Some(view) = state.on_click.get(selector).cloned() {
            state.apply(&view);
        }
        Ok(true)
    }

    async fn click_nth(&self, selector: &str, index: usize) -> BrowseResult<bool> {
        let mut state = self.state.lock().unwrap();
        if Self::match_count(&state.html, selector) <= index {
            return Ok(false);
        }
        state.clicked.push(format!("{}#{}", selector, index));
        if let Some(view) = state
            .on_click_nth
            .get(&(selector.to_string(), index))
            .cloned()
        {
            state.apply(&view);
        }
        Ok(true)
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowseResult<bool> {
        let mut state = self.state.lock().unwrap();
        if !Self::matches(&state.html, selector) {
            return Ok(false);
        }
        state.typed.push((selector.to_string(), text.to_string()));
        Ok(true)
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> BrowseResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(Self::matches(&state.html, selector))
    }

    async fn cookies(&self) -> BrowseResult<Vec<Cookie>> {
        Ok(self.state.lock().unwrap().cookies.clone())
    }

    async fn set_cookies(&self, cookies: Vec<Cookie>) -> BrowseResult<()> {
        let mut state = self.state.lock().unwrap();
        state.cookies = cookies;
        state.cookie_replays += 1;
        Ok(())
    }

    async fn popup_url(&self) -> BrowseResult<Option<String>> {
        Ok(self.state.lock().unwrap().popup.take())
    }

    async fn back(&self) -> BrowseResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(previous) = state.url_history.pop() {
            state.url = previous;
        }
        Ok(())
    }

    async fn close(&self) -> BrowseResult<()> {
        Ok(())
    }
}

/// Cookie helper for session fixtures
pub fn cookie(name: &str, value: &str) -> Cookie {
    Cookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: Some(".linkedin.com".to_string()),
        path: Some("/".to_string()),
        expires: None,
        http_only: Some(true),
        secure: Some(true),
    }
}

/// Scripted organization fetcher with call accounting
pub struct MapOrgFetcher {
    pub details: HashMap<String, OrgDetails>,
    pub calls: AtomicUsize,
    pub seeded: Mutex<Vec<Cookie>>,
    pub closes: AtomicUsize,
}

impl MapOrgFetcher {
    pub fn new(details: HashMap<String, OrgDetails>) -> Arc<Self> {
        Arc::new(Self {
            details,
            calls: AtomicUsize::new(0),
            seeded: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(HashMap::new())
    }
}

#[async_trait]
impl jobscout::enrich::OrgFetcher for MapOrgFetcher {
    async fn fetch(&self, org_ref: &str) -> Result<OrgDetails, ScoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.details.get(org_ref) {
            Some(details) => Ok(details.clone()),
            None => Err(ScoutError::OrgFetch {
                org_ref: org_ref.to_string(),
                message: "no such organization".to_string(),
            }),
        }
    }

    async fn seed(&self, cookies: Vec<Cookie>) {
        *self.seeded.lock().unwrap() = cookies;
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
