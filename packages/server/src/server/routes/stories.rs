//! Story routes: authoring, reading and unlock requests.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::error::ApiResult;
use crate::common::StoryId;
use crate::domains::stories::activities::{get_story, publish_story, UnlockDecision, UnlockReason};
use crate::domains::stories::data::StoryView;
use crate::domains::stories::{StorySubmission, SwapSettings};
use crate::domains::swaps::activities::request_unlock;
use crate::domains::swaps::UnlockResponse;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct PublishStoryRequest {
    #[serde(flatten)]
    pub story: StorySubmission,
    /// Locked behind a swap unless the author says otherwise
    #[serde(default)]
    pub swap_settings: SwapSettings,
}

/// POST /api/stories
pub async fn publish_story_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<PublishStoryRequest>,
) -> ApiResult<(StatusCode, Json<StoryView>)> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    let story = publish_story(user.member_id, body.story, body.swap_settings, &state.deps).await?;
    let view = StoryView::new(story, UnlockDecision::open(UnlockReason::Author));
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/stories/:id
///
/// Anonymous callers are allowed; locked content comes back redacted.
pub async fn get_story_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(story_id): Path<StoryId>,
) -> ApiResult<Json<StoryView>> {
    let viewer = user.map(|Extension(u)| u.member_id);
    let view = get_story(story_id, viewer, &state.deps).await?;
    Ok(Json(view))
}

/// POST /api/stories/:id/unlock
pub async fn request_unlock_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(story_id): Path<StoryId>,
    Json(submission): Json<StorySubmission>,
) -> ApiResult<Json<UnlockResponse>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    let response = request_unlock(user.member_id, story_id, submission, &state.deps).await?;
    Ok(Json(response))
}
