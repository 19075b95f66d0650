//! Mapping from domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::{AuthError, SwapId};
use crate::domains::stories::StoryError;
use crate::domains::swaps::SwapError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<SwapId>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: Vec::new(),
            swap_id: None,
        }
    }
}

/// Error returned by every route handler
#[derive(Debug)]
pub enum ApiError {
    Swap(SwapError),
    Story(StoryError),
    Auth(AuthError),
}

impl From<SwapError> for ApiError {
    fn from(err: SwapError) -> Self {
        ApiError::Swap(err)
    }
}

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        ApiError::Story(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl ApiError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Swap(err) => swap_error_response(err),
            ApiError::Story(err) => story_error_response(err),
            ApiError::Auth(err) => {
                let status = match err {
                    AuthError::AuthenticationRequired | AuthError::InvalidToken => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::PermissionDenied(_) | AuthError::AdminRequired => {
                        StatusCode::FORBIDDEN
                    }
                };
                (status, ErrorBody::message(err.to_string()))
            }
        }
    }
}

fn swap_error_response(err: SwapError) -> (StatusCode, ErrorBody) {
    match err {
        SwapError::ValidationFailed { violations } => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "Submission does not meet the swap requirements".to_string(),
                errors: violations,
                swap_id: None,
            },
        ),
        // Reasons stay with staff; the caller only learns the swap is under review
        SwapError::ModerationFailed { swap_id } => (
            StatusCode::ACCEPTED,
            ErrorBody {
                error: "Submission is pending manual review".to_string(),
                errors: Vec::new(),
                swap_id: Some(swap_id),
            },
        ),
        SwapError::DuplicateSwap { swap_id } => (
            StatusCode::CONFLICT,
            ErrorBody {
                error: "A swap for this story is already in progress".to_string(),
                errors: Vec::new(),
                swap_id,
            },
        ),
        SwapError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string())),
        SwapError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorBody::message(err.to_string())),
        SwapError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, ErrorBody::message(err.to_string()))
        }
        SwapError::ProcessingFault(source) => {
            error!(error = %source, "Swap request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::message("Internal server error"),
            )
        }
    }
}

fn story_error_response(err: StoryError) -> (StatusCode, ErrorBody) {
    match err {
        StoryError::NotFound => (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string())),
        StoryError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorBody::message(err.to_string())),
        StoryError::Invalid(problems) => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "Invalid story".to_string(),
                errors: problems,
                swap_id: None,
            },
        ),
        StoryError::Fault(source) => {
            error!(error = %source, "Story request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::message("Internal server error"),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
