//! Configuration validation.
//!
//! Validates configuration before each connection attempt to catch missing
//! settings early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server is required")]
    MissingServer,
    #[error("username is required")]
    MissingUsername,
    #[error("realname is required")]
    MissingRealname,
    #[error("nick is required")]
    MissingNick,
    #[error("port must be non-zero")]
    InvalidPort,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        (&config.server, ValidationError::MissingServer),
        (&config.username, ValidationError::MissingUsername),
        (&config.realname, ValidationError::MissingRealname),
        (&config.nick, ValidationError::MissingNick),
    ];
    for (value, error) in required {
        if value.trim().is_empty() {
            errors.push(error);
        }
    }

    if config.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
