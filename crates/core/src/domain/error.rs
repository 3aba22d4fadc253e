// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid {field}: {reason}")]
    InvalidId { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
