//! Authentication state machine
//!
//! Sign-in proceeds through a fixed set of states:
//!
//! `Unauthenticated → SessionCheck → {Authenticated | LoginForm}
//!                  → {Authenticated | Challenge} → {Authenticated | Failed}`
//!
//! A persisted cookie set is always tried first; only when its replay lands
//! somewhere unauthenticated does the machine touch the login form. Interactive
//! security challenges are resolved with a one-shot verification-code lookup,
//! falling back to a bounded wait for a human to complete the challenge in a
//! headed browser.

use crate::browser::{SelectorChain, Surface};
use crate::config::AccountConfig;
use crate::session::{CodeProvider, SessionStore};
use crate::ScoutError;
use scraper::Html;
use std::time::Duration;
use tokio::time::Instant;

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const LANDING_URL: &str = "https://www.linkedin.com/feed/";

/// Address fragments that mean the session is signed in
const AUTHENTICATED_PATTERNS: &[&str] = &[
    "linkedin.com/feed",
    "linkedin.com/jobs",
    "linkedin.com/mynetwork",
    "linkedin.com/in/",
];

/// Address fragments that mean a security challenge is being presented
const CHALLENGE_PATTERNS: &[&str] = &["/checkpoint/challenge", "/checkpoint/lg/", "/checkpoint/rm/"];

const USERNAME_INPUT: &str = "#username";
const PASSWORD_INPUT: &str = "#password";
const LOGIN_SUBMIT: &str = "button[type='submit']";

/// Candidate selectors for the challenge's code input, in priority order
const CODE_INPUT_SELECTORS: &[&str] = &[
    "#input__email_verification_pin",
    "input[name='pin']",
    "input[autocomplete='one-time-code']",
    "#two-step-challenge input",
];

/// Candidate selectors for the challenge's submit control
const CODE_SUBMIT_SELECTORS: &[&str] = &["#email-pin-submit-button", "button[type='submit']"];

/// Authentication progress of one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing attempted yet
    Unauthenticated,

    /// Replaying persisted cookies and probing the landing surface
    SessionCheck,

    /// Submitting credentials to the login form
    LoginForm,

    /// An interactive security challenge is being resolved
    Challenge,

    /// Signed in; terminal for this engine instance
    Authenticated,

    /// Sign-in failed; terminal, a new engine is required to retry
    Failed,
}

impl AuthState {
    /// Returns true if no further transition can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed)
    }
}

/// Timing knobs for the sign-in flow.
///
/// Tests shrink these to milliseconds; production uses the defaults.
#[derive(Debug, Clone)]
pub struct AuthTiming {
    /// Fixed wait after submitting a form, letting the redirect land
    pub settle: Duration,

    /// Bound on waiting for the login form to render
    pub form_wait: Duration,

    /// Total bound on waiting for a human to resolve a challenge
    pub challenge_wait: Duration,

    /// Address re-check interval during the challenge wait
    pub challenge_poll: Duration,
}

impl Default for AuthTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            form_wait: Duration::from_secs(5),
            challenge_wait: Duration::from_secs(120),
            challenge_poll: Duration::from_secs(2),
        }
    }
}

/// Drives a browsing surface from `Unauthenticated` to `Authenticated`.
pub struct Authenticator {
    account: AccountConfig,
    store: SessionStore,
    provider: Option<Box<dyn CodeProvider>>,
    timing: AuthTiming,
    state: AuthState,
    code_inputs: SelectorChain,
}

impl Authenticator {
    pub fn new(
        account: AccountConfig,
        store: SessionStore,
        provider: Option<Box<dyn CodeProvider>>,
    ) -> Self {
        Self::with_timing(account, store, provider, AuthTiming::default())
    }

    pub fn with_timing(
        account: AccountConfig,
        store: SessionStore,
        provider: Option<Box<dyn CodeProvider>>,
        timing: AuthTiming,
    ) -> Self {
        Self {
            account,
            store,
            provider,
            timing,
            state: AuthState::Unauthenticated,
            code_inputs: SelectorChain::new(CODE_INPUT_SELECTORS),
        }
    }

    /// Current state, for logging and tests
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Ensures the surface is signed in.
    ///
    /// Idempotent once `Authenticated` has been reached; a machine that has
    /// already `Failed` refuses further attempts (construct a new engine to
    /// retry). Every successful transition into `Authenticated` persists the
    /// surface's cookie set before returning.
    pub async fn ensure(&mut self, surface: &dyn Surface) -> Result<(), ScoutError> {
        match self.state {
            AuthState::Authenticated => return Ok(()),
            AuthState::Failed => return Err(ScoutError::AuthFailed),
            _ => {}
        }

        // SessionCheck: replay persisted cookies and probe the landing surface
        self.state = AuthState::SessionCheck;
        if let Some(cookies) = self.store.load()? {
            if !cookies.is_empty() {
                tracing::info!("Replaying {} persisted session cookies", cookies.len());
                surface.set_cookies(cookies).await?;
                surface.goto(LANDING_URL).await?;
                tokio::time::sleep(self.timing.settle).await;

                let url = surface.current_url().await?;
                if is_authenticated_url(&url) {
                    tracing::info!("Persisted session is still valid");
                    return self.enter_authenticated(surface).await;
                }
                tracing::info!("Persisted session rejected (landed on {}), signing in", url);
            }
        } else {
            tracing::info!("No persisted session found, signing in");
        }

        // LoginForm: submit credentials
        self.state = AuthState::LoginForm;
        surface.goto(LOGIN_URL).await?;
        surface.wait_for(USERNAME_INPUT, self.timing.form_wait).await?;
        surface.type_text(USERNAME_INPUT, &self.account.email).await?;
        surface
            .type_text(PASSWORD_INPUT, &self.account.password)
            .await?;
        surface.click(LOGIN_SUBMIT).await?;
        tokio::time::sleep(self.timing.settle).await;

        let url = surface.current_url().await?;
        if is_authenticated_url(&url) {
            return self.enter_authenticated(surface).await;
        }

        if is_challenge_url(&url) {
            tracing::info!("Security challenge presented at {}", url);
            self.state = AuthState::Challenge;
            return self.resolve_challenge(surface).await;
        }

        self.state = AuthState::Failed;
        Err(ScoutError::AmbiguousAuthState { url })
    }

    /// Resolves an interactive security challenge.
    ///
    /// One verification-code attempt through the provider (if a code input is
    /// recognizable and the provider yields a code), then a bounded wait for
    /// the address to become authenticated by out-of-band completion.
    async fn resolve_challenge(&mut self, surface: &dyn Surface) -> Result<(), ScoutError> {
        let html = surface.content().await?;
        // Parsed in a sync scope; only the matched selector crosses the awaits
        let code_input = {
            let doc = Html::parse_document(&html);
            self.code_inputs
                .select_first(doc.root_element())
                .and_then(|(idx, _)| self.code_inputs.raw(idx))
        };

        if let Some(input_selector) = code_input {
            if let Some(provider) = &self.provider {
                if let Some(code) = provider.fetch_code().await {
                    tracing::info!("Submitting verification code");
                    surface.type_text(input_selector, &code).await?;
                    for submit in CODE_SUBMIT_SELECTORS {
                        if surface.click(submit).await? {
                            break;
                        }
                    }
                    tokio::time::sleep(self.timing.settle).await;

                    let url = surface.current_url().await?;
                    if is_authenticated_url(&url) {
                        return self.enter_authenticated(surface).await;
                    }
                    tracing::warn!("Verification code did not clear the challenge");
                } else {
                    tracing::warn!("No verification code available");
                }
            } else {
                tracing::info!("No code provider configured");
            }
        } else {
            tracing::info!("No recognizable code input on challenge page");
        }

        // Manual completion: poll the address until it becomes authenticated
        tracing::info!(
            "Waiting up to {}s for the challenge to be completed manually",
            self.timing.challenge_wait.as_secs()
        );
        let deadline = Instant::now() + self.timing.challenge_wait;
        while Instant::now() < deadline {
            tokio::time::sleep(self.timing.challenge_poll).await;
            let url = surface.current_url().await?;
            if is_authenticated_url(&url) {
                return self.enter_authenticated(surface).await;
            }
        }

        self.state = AuthState::Failed;
        Err(ScoutError::ChallengeTimeout {
            seconds: self.timing.challenge_wait.as_secs(),
        })
    }

    /// Terminal success: capture and persist the surface's cookies.
    async fn enter_authenticated(&mut self, surface: &dyn Surface) -> Result<(), ScoutError> {
        let cookies = surface.cookies().await?;
        self.store.save(&cookies)?;
        self.state = AuthState::Authenticated;
        tracing::info!("Authenticated; session persisted");
        Ok(())
    }
}

/// Whether an address matches any known authenticated pattern
pub fn is_authenticated_url(url: &str) -> bool {
    AUTHENTICATED_PATTERNS.iter().any(|p| url.contains(p))
}

/// Whether an address matches any known challenge pattern
pub fn is_challenge_url(url: &str) -> bool {
    CHALLENGE_PATTERNS.iter().any(|p| url.contains(p))
}
