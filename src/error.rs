//! Error types for Vault-Tec.
//!
//! Defines the main error enum used by the application shell. The monk
//! bridge itself never returns these: every bridge failure is reported
//! through a `CommandResult`.

use thiserror::Error;

/// Main error type for Vault-Tec operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration errors (invalid config file, bad environment values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal setup/teardown and rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A monk command failed in a way the caller treats as fatal.
    #[error("Command error: {0}")]
    Command(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a terminal error with the given message.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Creates a command error with the given message.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Terminal(_) => "Terminal Error",
            Self::Command(_) => "Command Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using VaultError.
pub type Result<T> = std::result::Result<T, VaultError>;
