//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Header names must be usable HTTP header names
//! - Addresses and log levels must parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use tracing::Level;

use crate::config::schema::AppConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client_ip.header_names must not be empty")]
    NoHeaderNames,
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    #[error("invalid listener.bind_address {0:?}")]
    InvalidBindAddress(String),
    #[error("invalid observability.metrics_address {0:?}")]
    InvalidMetricsAddress(String),
    #[error("unknown observability.log_level {0:?}")]
    InvalidLogLevel(String),
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a parsed config, collecting every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // An empty list is legal for the resolver (transport only) but almost
    // certainly a mistake in a file.
    if config.client_ip.header_names.is_empty() {
        errors.push(ValidationError::NoHeaderNames);
    }
    for name in &config.client_ip.header_names {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.observability.log_level.parse::<Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.client_ip.header_names = vec!["X-Forwarded-For".into(), "bad header".into(), String::new()];
        config.listener.bind_address = "nowhere".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidHeaderName("bad header".into()),
                ValidationError::InvalidHeaderName(String::new()),
                ValidationError::InvalidBindAddress("nowhere".into()),
                ValidationError::InvalidLogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_empty_header_list_rejected() {
        let mut config = AppConfig::default();
        config.client_ip.header_names.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoHeaderNames]));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("bogus".into())])
        );
    }
}
