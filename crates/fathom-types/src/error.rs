//! Error types for FATHOM_OS.

use std::io;

/// Errors produced by the FATHOM_OS framework.
///
/// Most failure modes in the facility OS are simulated states (crashes,
/// lockdowns) rather than errors. These variants cover the few surfaces that
/// genuinely fail: persistence, configuration, and authorization.
#[derive(Debug, thiserror::Error)]
pub enum FathomError {
    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FathomError>;
