use serde::Deserialize;

/// Main configuration structure for jobscout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Mail-inbox lookup used to resolve security-challenge codes; when absent
    /// the engine falls back to a bounded manual-completion wait
    pub mailbox: Option<MailboxConfig>,
}

/// Platform account credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Sign-in email address
    pub email: String,

    /// Sign-in password
    pub password: String,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run Chromium without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Path to a Chromium/Chrome binary; autodetected when absent
    #[serde(rename = "chrome-binary")]
    pub chrome_binary: Option<String>,
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the JSON file holding the captured cookie set
    #[serde(rename = "cookie-path", default = "default_cookie_path")]
    pub cookie_path: String,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Mail-inbox lookup service for verification codes
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    /// Endpoint returning the most recent platform mail for the account
    pub endpoint: String,

    /// Bearer token sent with each lookup, if the service requires one
    pub token: Option<String>,
}

fn default_headless() -> bool {
    true
}

fn default_cookie_path() -> String {
    "./session-cookies.json".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_binary: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_path: default_cookie_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
