use thiserror::Error;

/// Failure taxonomy shared by every resolver. None of these are retried inside
/// the engine; the boundary layer decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Malformed or out-of-range input.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    /// Legal input, but the current state forbids it.
    #[error("action not allowed: {0}")]
    Precondition(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// A concurrent mutation won the race (stale pause token, duplicate profile).
    #[error("conflict: {0}")]
    Conflict(String),
}

pub type GameResult<T> = Result<T, GameError>;

impl GameError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
