//! Error types for the todo service.

use crate::model::TodoId;
use thiserror::Error;

/// Errors returned by [`crate::TodoService`].
#[derive(Debug, Error)]
pub enum TodoError {
    /// Bad input, e.g. an empty title.
    #[error("{0}")]
    Validation(String),

    /// No todo with this id exists.
    #[error("Todo not found")]
    NotFound(TodoId),

    /// The todo exists but belongs to another user.
    #[error("Todo belongs to another user")]
    Forbidden(TodoId),

    /// Storage failure.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
