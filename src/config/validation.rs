use crate::config::types::{AccountConfig, Config, MailboxConfig, ServerConfig, SessionConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Missing or malformed required fields are construction-time errors; nothing
/// here is retried or deferred to runtime.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_account(&config.account)?;
    validate_session(&config.session)?;
    validate_server(&config.server)?;
    if let Some(mailbox) = &config.mailbox {
        validate_mailbox(mailbox)?;
    }
    Ok(())
}

/// Validates the platform account credentials
fn validate_account(config: &AccountConfig) -> Result<(), ConfigError> {
    if config.email.is_empty() {
        return Err(ConfigError::Validation(
            "account.email cannot be empty".to_string(),
        ));
    }

    validate_email(&config.email)?;

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "account.password cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates session persistence configuration
fn validate_session(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.cookie_path.is_empty() {
        return Err(ConfigError::Validation(
            "session.cookie-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP API configuration
fn validate_server(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation(
            "server.host cannot be empty".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be non-zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates the mail-inbox lookup configuration
fn validate_mailbox(config: &MailboxConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid mailbox.endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "mailbox.endpoint must be an http(s) URL, got '{}'",
            config.endpoint
        )));
    }

    if let Some(token) = &config.token {
        if token.is_empty() {
            return Err(ConfigError::Validation(
                "mailbox.token cannot be empty when present".to_string(),
            ));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::BrowserConfig;

    fn base_config() -> Config {
        Config {
            account: AccountConfig {
                email: "scout@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
            },
            browser: BrowserConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
            mailbox: None,
        }
    }

    #[test]
    fn test_validate_accepts_base_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_password() {
        let mut config = base_config();
        config.account.password.clear();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut config = base_config();
        config.account.email = "not-an-email".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = base_config();
        config.server.port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_mailbox_endpoint() {
        let mut config = base_config();
        config.mailbox = Some(MailboxConfig {
            endpoint: "ftp://mail.example.com".to_string(),
            token: None,
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
