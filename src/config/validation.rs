//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the non-empty urldb backend list the selector relies on
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    EmptyBackendList,
    EmptyEndpoint(usize),
    ZeroLookupTimeout,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a socket address", addr)
            }
            ValidationError::EmptyBackendList => {
                write!(f, "urldb must list at least one backend")
            }
            ValidationError::EmptyEndpoint(i) => {
                write!(f, "urldb[{}].endpoint is empty", i)
            }
            ValidationError::ZeroLookupTimeout => {
                write!(f, "timeouts.lookup_secs must be greater than zero")
            }
        }
    }
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    // Backend selection divides by the list length.
    if config.urldb.is_empty() {
        errors.push(ValidationError::EmptyBackendList);
    }
    for (i, backend) in config.urldb.iter().enumerate() {
        if backend.endpoint.is_empty() {
            errors.push(ValidationError::EmptyEndpoint(i));
        }
    }

    if config.timeouts.lookup_secs == 0 {
        errors.push(ValidationError::ZeroLookupTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
