//! # Error Types
//!
//! Error taxonomy for the gateway configuration client using `thiserror`.
//!
//! Every public Store operation reports one of these variants instead of
//! panicking. Transport-like failures (`Transport`, `MalformedResponse`) are
//! what the Store surfaces as its connection error.

/// Custom result type for gwctl operations
pub type Result<T> = std::result::Result<T, GwctlError>;

/// Main error type for the gateway configuration client
#[derive(thiserror::Error, Debug)]
pub enum GwctlError {
    /// Network or HTTP status failure reaching the remote gateway
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The remote gateway answered with a body that could not be normalized
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse {
        endpoint: String,
        message: String,
    },

    /// Structural or field validation failure
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Mutation attempted while the configuration is externally managed
    #[error("Configuration is read-only (externally managed): {operation} rejected")]
    ReadOnly { operation: String },

    /// A remote write failed after the local optimistic update was applied.
    /// The local state has already been restored when this is returned.
    #[error("{operation} failed and was rolled back: {source}")]
    OptimisticRollback {
        operation: String,
        #[source]
        source: Box<GwctlError>,
    },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound {
        resource_type: String,
        id: String,
    },

    /// Resource conflict errors (e.g., already exists)
    #[error("Resource conflict: {message}")]
    Conflict {
        message: String,
        resource_type: String,
    },

    /// Client configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Internal errors (task failures, poisoned state)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GwctlError {
    /// Create a transport error without an HTTP status
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Create a transport error carrying the HTTP status returned by the gateway
    pub fn transport_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a malformed response error
    pub fn malformed<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a read-only error for the named operation
    pub fn read_only<S: Into<String>>(operation: S) -> Self {
        Self::ReadOnly {
            operation: operation.into(),
        }
    }

    /// Wrap the failure of a remote write that forced a rollback
    pub fn rollback<S: Into<String>>(operation: S, source: GwctlError) -> Self {
        Self::OptimisticRollback {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict {
            message: message.into(),
            resource_type: resource_type.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for failures reaching or understanding the remote gateway,
    /// including when they caused an optimistic rollback.
    pub fn is_transport_like(&self) -> bool {
        match self {
            GwctlError::Transport { .. } | GwctlError::MalformedResponse { .. } => true,
            GwctlError::OptimisticRollback { source, .. } => source.is_transport_like(),
            _ => false,
        }
    }

    /// Check if the failed operation may succeed when issued again
    pub fn is_retryable(&self) -> bool {
        match self {
            GwctlError::Transport { status, .. } => {
                status.map_or(true, |s| s >= 500 || s == 408 || s == 429)
            }
            GwctlError::OptimisticRollback { source, .. } => source.is_retryable(),
            GwctlError::Io { .. } => true,
            _ => false,
        }
    }

    /// Human readable message suitable for a persistent status banner
    pub fn banner_message(&self) -> String {
        match self {
            GwctlError::Transport { message, status: Some(status) } => {
                format!("Failed to reach gateway (HTTP {}): {}", status, message)
            }
            GwctlError::Transport { message, status: None } => {
                format!("Failed to reach gateway: {}", message)
            }
            GwctlError::MalformedResponse { endpoint, .. } => {
                format!("Gateway returned an unexpected response for {}", endpoint)
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for GwctlError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            source: error,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl From<serde_json::Error> for GwctlError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            source: error,
            context: "JSON serialization failed".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for GwctlError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = Vec::new();
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                fields.push(field.to_string());
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::Validation {
            message: format!("Validation failed: {}", message),
            field: if fields.len() == 1 { fields.pop() } else { None },
        }
    }
}

impl From<tokio::task::JoinError> for GwctlError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Store task did not complete: {}", error))
    }
}
