//! Error types for tg_tools

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing TG_API_ID/TG_API_HASH (check {0})")]
    MissingCredentials(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Usage(String),

    #[error("Session is locked by another process")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Two-step verification is enabled: a password is required")]
    PasswordRequired,

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

/// Decides whether a failed sign-in should be retried with the 2FA password.
///
/// The structured kind is checked first; any other error qualifies when its
/// message mentions a password.
pub fn requires_second_factor(err: &Error) -> bool {
    match err {
        Error::PasswordRequired => true,
        other => other.to_string().to_lowercase().contains("password"),
    }
}
