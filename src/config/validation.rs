//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempt budgets > 0)
//! - Check the endpoint address parses before any network activity
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: `ProbeConfig` → `Result<(), Vec<ValidationError>>`
//! - Runs before a config is accepted by the binary

use thiserror::Error;

use crate::config::schema::{ProbeConfig, SocketKind};
use crate::net::endpoint::Endpoint;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {problem}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub problem: String,
}

fn problem(field: &'static str, problem: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        problem: problem.into(),
    }
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoint.is_empty() {
        errors.push(problem("endpoint", "must be set to <host>:<port>"));
    } else if let Err(e) = Endpoint::parse(&config.endpoint) {
        errors.push(problem("endpoint", e.to_string()));
    }

    if config.link.poll_timeout_ms == 0 {
        errors.push(problem("link.poll_timeout_ms", "must be greater than 0"));
    }
    if config.link.read_chunk_bytes == 0 {
        errors.push(problem("link.read_chunk_bytes", "must be greater than 0"));
    }
    if config.link.kind != SocketKind::Stream {
        errors.push(problem("link.kind", "only stream links are dialable"));
    }

    if config.retry.max_attempts == 0 {
        errors.push(problem("retry.max_attempts", "must be greater than 0"));
    }
    if config.retry.initial_delay_ms == 0 {
        errors.push(problem("retry.initial_delay_ms", "must be greater than 0"));
    }
    if config.retry.backoff_multiplier <= 1.0 {
        errors.push(problem("retry.backoff_multiplier", "must be greater than 1"));
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
    fn default_config_with_endpoint_is_valid() {
        let config = ProbeConfig {
            endpoint: "192.168.0.205:9100".into(),
            ..ProbeConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn every_problem_is_reported() {
        let mut config = ProbeConfig::default();
        config.link.poll_timeout_ms = 0;
        config.link.read_chunk_bytes = 0;
        config.retry.max_attempts = 0;
        config.retry.backoff_multiplier = 1.0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"endpoint"));
        assert!(fields.contains(&"link.poll_timeout_ms"));
        assert!(fields.contains(&"link.read_chunk_bytes"));
        assert!(fields.contains(&"retry.max_attempts"));
        assert!(fields.contains(&"retry.backoff_multiplier"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn malformed_endpoint_is_reported() {
        let config = ProbeConfig {
            endpoint: "no-port-here".into(),
            ..ProbeConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endpoint");
    }
}
