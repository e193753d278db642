//! # Configuration Management
//!
//! Settings for reaching the gateway admin API and for local state. The CLI
//! resolves them from flags, `~/.gwctl/config.toml` and `GWCTL_*`
//! environment variables before building a [`ClientSettings`].

pub mod settings;

pub use settings::{ClientSettings, LogFormat};
