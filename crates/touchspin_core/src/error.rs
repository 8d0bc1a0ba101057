//! Error types for touchspin_core
//!
//! Invalid setting *values* are never errors; the sanitizer resolves them.
//! These errors only cover textual inputs that cannot be interpreted at all.

use thiserror::Error;

/// Errors raised while parsing configuration text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// `forcestepdivisibility` literal is not one of none/round/floor/ceil
    #[error("Unknown step divisibility policy: {0}")]
    UnknownDivisibility(String),

    /// Option name does not correspond to any setting
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// Configuration document is not valid JSON
    #[error("Malformed settings document: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err.to_string())
    }
}

/// Result type for settings parsing
pub type Result<T> = std::result::Result<T, SettingsError>;
