use thiserror::Error;

use crate::common::AuthError;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story not found")]
    NotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid story: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("story operation failed: {0}")]
    Fault(#[from] anyhow::Error),
}

impl From<AuthError> for StoryError {
    fn from(err: AuthError) -> Self {
        StoryError::Forbidden(err.to_string())
    }
}
