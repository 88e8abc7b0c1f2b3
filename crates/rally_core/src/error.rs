use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Whether retrying the same operation can succeed without caller changes.
    ///
    /// `Conflict` is an optimistic-lock collision reserved for a durable
    /// backend; the other three require the caller to fix its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
