//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("limits.max_clients must be at least 1")]
    ZeroCapacity,
    #[error("limits.inbound_queue_capacity must be at least 1")]
    ZeroQueue,
    #[error("limits.max_message_bytes must be at least 1")]
    ZeroMessageSize,
    #[error("limits.write_timeout_ms must be at least 1")]
    ZeroWriteTimeout,
    #[error("limits.handshake_timeout_ms must be at least 1")]
    ZeroHandshakeTimeout,
    #[error("listen.path must start with '/', got '{0}'")]
    InvalidPath(String),
    #[error("history.path is empty")]
    EmptyHistoryPath,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_clients == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }
    if config.limits.inbound_queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueue);
    }
    if config.limits.max_message_bytes == 0 {
        errors.push(ValidationError::ZeroMessageSize);
    }
    if config.limits.write_timeout_ms == 0 {
        errors.push(ValidationError::ZeroWriteTimeout);
    }
    if config.limits.handshake_timeout_ms == 0 {
        errors.push(ValidationError::ZeroHandshakeTimeout);
    }
    if !config.listen.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.listen.path.clone()));
    }
    if config.history.enabled && config.history.path.trim().is_empty() {
        errors.push(ValidationError::EmptyHistoryPath);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn relative_path_is_rejected() {
        let mut config = Config::default();
        config.listen.path = "ws".to_string();
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::InvalidPath(p)] if p == "ws"));
    }

    #[test]
    fn zero_deadlines_are_rejected() {
        let mut config = Config::default();
        config.limits.write_timeout_ms = 0;
        config.limits.handshake_timeout_ms = 0;
        let errors = validate(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::ZeroWriteTimeout, ValidationError::ZeroHandshakeTimeout]
        ));
    }

    #[test]
    fn disabled_history_may_have_empty_path() {
        let mut config = Config::default();
        config.history.enabled = false;
        config.history.path.clear();
        assert!(validate(&config).is_ok());
    }
}
