//! # Validation Module
//!
//! Client-side validation for the gateway configuration. The gateway does
//! not enforce these rules itself, so they are checked here before edits are
//! written back.
//!
//! Two layers:
//! 1. Field validation of edit payloads (`requests`), implemented on the
//!    domain types through the `validator` crate's [`Validate`] trait and
//!    the regex helpers below
//! 2. Structural rules over the whole tree (`business_rules`), such as
//!    HTTP/TCP route exclusivity on a listener

use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate, ValidationError};

use crate::errors::{GwctlError, Result};

pub mod business_rules;
pub mod requests;

pub use business_rules::{
    ensure_listener_valid, find_invalid_listeners, find_invalid_listeners_in, InvalidListener,
};

lazy_static! {
    /// Listener names: alphanumeric, underscore, hyphen only
    static ref LISTENER_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$")
        .expect("LISTENER_NAME_REGEX should be a valid regex pattern");

    /// Route names: alphanumeric, underscore, period, hyphen
    static ref ROUTE_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.-]+$")
        .expect("ROUTE_NAME_REGEX should be a valid regex pattern");

    /// Rule set names: alphanumeric, underscore, period, hyphen
    static ref POLICY_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.-]+$")
        .expect("POLICY_NAME_REGEX should be a valid regex pattern");

    /// JWT claim names, including namespaced claims such as `https://x/roles`
    static ref CLAIM_KEY_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.:/-]+$")
        .expect("CLAIM_KEY_REGEX should be a valid regex pattern");

    /// Listener hostnames: a domain, optionally with a leading wildcard label
    static ref HOSTNAME_REGEX: Regex = Regex::new(r"^(\*|(\*\.)?[a-zA-Z0-9.-]+)$")
        .expect("HOSTNAME_REGEX should be a valid regex pattern");

    /// Static host backends: `hostname:port`
    static ref HOST_PORT_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9.-]+:[0-9]{1,5}$")
        .expect("HOST_PORT_REGEX should be a valid regex pattern");

    /// Service backends: `<namespace>/<hostname>`
    static ref SERVICE_NAME_REGEX: Regex = Regex::new(r"^[a-z0-9-]+/[a-zA-Z0-9.-]+$")
        .expect("SERVICE_NAME_REGEX should be a valid regex pattern");

    /// HTTP method validation: standard HTTP verbs only
    static ref HTTP_METHOD_REGEX: Regex =
        Regex::new(r"^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS|TRACE|CONNECT)$")
            .expect("HTTP_METHOD_REGEX should be a valid regex pattern");
}

/// Validate listener names
pub fn validate_listener_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.len() > 100 || !LISTENER_NAME_REGEX.is_match(name) {
        return Err(ValidationError::new("invalid_listener_name"));
    }
    Ok(())
}

/// Validate route names
pub fn validate_route_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.len() > 100 || !ROUTE_NAME_REGEX.is_match(name) {
        return Err(ValidationError::new("invalid_route_name"));
    }
    Ok(())
}

/// Validate rule set names
pub fn validate_policy_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.len() > 100 || !POLICY_NAME_REGEX.is_match(name) {
        return Err(ValidationError::new("invalid_policy_name"));
    }
    Ok(())
}

/// Validate JWT claim keys used by rules
pub fn validate_claim_key(key: &str) -> std::result::Result<(), ValidationError> {
    if !CLAIM_KEY_REGEX.is_match(key) {
        return Err(ValidationError::new("invalid_claim_key"));
    }
    Ok(())
}

/// Validate listener hostname patterns
pub fn validate_hostname(hostname: &str) -> std::result::Result<(), ValidationError> {
    if !HOSTNAME_REGEX.is_match(hostname) {
        return Err(ValidationError::new("invalid_hostname"));
    }
    Ok(())
}

/// Validate `hostname:port` pairs
pub fn validate_host_port(host: &str) -> std::result::Result<(), ValidationError> {
    if !HOST_PORT_REGEX.is_match(host) {
        return Err(ValidationError::new("invalid_host_port"));
    }
    let port_ok = host
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse::<u16>().ok())
        .is_some_and(|port| port > 0);
    if !port_ok {
        return Err(ValidationError::new("invalid_port"));
    }
    Ok(())
}

/// Validate `<namespace>/<hostname>` service references
pub fn validate_service_name(name: &str) -> std::result::Result<(), ValidationError> {
    if !SERVICE_NAME_REGEX.is_match(name) {
        return Err(ValidationError::new("invalid_service_name"));
    }
    Ok(())
}

/// Validate HTTP methods
pub fn validate_http_method(method: &str) -> std::result::Result<(), ValidationError> {
    if !HTTP_METHOD_REGEX.is_match(method) {
        return Err(ValidationError::new("invalid_http_method"));
    }
    Ok(())
}

/// Validate basic path structure
pub fn validate_path(path: &str) -> std::result::Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("path_cannot_be_empty"));
    }

    if !path.starts_with('/') {
        return Err(ValidationError::new("path_must_start_with_slash"));
    }

    if path.contains("..") {
        return Err(ValidationError::new("path_traversal_detected"));
    }

    if path.contains("//") {
        return Err(ValidationError::new("path_contains_double_slashes"));
    }

    Ok(())
}

/// Validate that a regex matcher compiles
pub fn validate_regex_pattern(pattern: &str) -> std::result::Result<(), ValidationError> {
    if pattern.is_empty() || Regex::new(pattern).is_err() {
        return Err(ValidationError::new("invalid_regex_pattern"));
    }
    Ok(())
}

/// Run field validation and convert failures into a [`GwctlError::Validation`]
pub fn validate_request<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(GwctlError::from)
}
