// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Transport/timeout talking to the shared store. Callers surface "try again".
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Chat platform error: {0}")]
    Chat(#[from] crate::port::ChatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the request may succeed if simply retried by the user
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// (StoreUnavailable for transport failures, Internal for the rest)
