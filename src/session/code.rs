//! Verification-code retrieval
//!
//! During an interactive security challenge the platform mails a six-digit
//! code to the account's inbox. A [`CodeProvider`] is the narrow seam through
//! which the authentication state machine asks for that code; the shipping
//! implementation polls a mail-inbox lookup service over HTTP.

use crate::config::MailboxConfig;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;

/// Upper bound on one inbox lookup, connect included
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Source of one-time verification codes.
///
/// Called at most once per challenge. Implementations must bound their own
/// runtime and report every failure mode as `None`.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    async fn fetch_code(&self) -> Option<String>;
}

/// Fetches the latest platform mail from a configured inbox-lookup endpoint
/// and extracts the first six-digit code from its body.
pub struct MailboxCodeProvider {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    code_regex: Regex,
}

impl MailboxCodeProvider {
    pub fn new(config: &MailboxConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            // Six digits not embedded in a longer digit run
            code_regex: Regex::new(r"(?:^|\D)(\d{6})(?:\D|$)").unwrap(),
        }
    }

    fn extract_code(&self, body: &str) -> Option<String> {
        self.code_regex
            .captures(body)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str().to_string())
    }
}

#[async_trait]
impl CodeProvider for MailboxCodeProvider {
    async fn fetch_code(&self) -> Option<String> {
        tracing::info!("Requesting verification code from mailbox lookup");

        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Mailbox lookup failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Mailbox lookup returned status {}", response.status());
            return None;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read mailbox response: {}", e);
                return None;
            }
        };

        match self.extract_code(&body) {
            Some(code) => {
                tracing::info!("Verification code retrieved");
                Some(code)
            }
            None => {
                tracing::warn!("No six-digit code found in latest mail");
                None
            }
        }
    }
}
