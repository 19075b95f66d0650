//! Typed errors for the swap engine.

use thiserror::Error;

use super::models::SwapStatus;
use crate::common::{AuthError, SwapId};

#[derive(Debug, Error)]
pub enum SwapError {
    /// Submission does not meet the target story's requirements
    #[error("submission does not meet the swap requirements: {}", violations.join("; "))]
    ValidationFailed { violations: Vec<String> },

    /// Automated checks flagged the submission. Reasons stay with staff.
    #[error("submission is pending manual review")]
    ModerationFailed { swap_id: SwapId },

    /// A live swap already holds the (member, story) slot
    #[error("a swap for this story is already in progress")]
    DuplicateSwap { swap_id: Option<SwapId> },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("cannot {action} a {from} swap")]
    InvalidTransition {
        from: SwapStatus,
        action: &'static str,
    },

    /// Storage or pipeline failure
    #[error("swap processing failed: {0}")]
    ProcessingFault(#[from] anyhow::Error),
}

impl From<AuthError> for SwapError {
    fn from(err: AuthError) -> Self {
        SwapError::Forbidden(err.to_string())
    }
}

pub type SwapResult<T> = std::result::Result<T, SwapError>;
