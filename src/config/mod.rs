//! Configuration module for jobscout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Validation happens at load time: an engine is never constructed from a config
//! with missing account credentials.
//!
//! # Example
//!
//! ```no_run
//! use jobscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Signing in as: {}", config.account.email);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AccountConfig, BrowserConfig, Config, MailboxConfig, ServerConfig, SessionConfig};

// Re-export parser functions
pub use parser::load_config;
