//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz has no questions")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("option {option:?} is not offered by the current question")]
    InvalidOption { option: String },
    #[error("the quiz can only be submitted from the last question")]
    NotOnLastQuestion,
    #[error("session no longer belongs to the signed-in user")]
    Detached,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
