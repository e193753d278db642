//! # Observability Infrastructure
//!
//! Structured logging for the gateway configuration client: subscriber
//! initialization and span macros for store and client operations.

pub mod logging;

pub use logging::{init_logging, log_settings_info};
