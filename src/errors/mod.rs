//! # Error Handling
//!
//! This module provides error handling for the gateway configuration client.
//! Errors are defined with `thiserror`; the CLI wraps them with `anyhow`
//! context at its boundary.

pub mod types;

pub use types::{GwctlError, Result};
