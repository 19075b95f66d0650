use chrono::Utc;
use tracing::debug;

use super::unlock::{can_view, redact};
use crate::common::{MemberId, StoryId};
use crate::domains::scoring::{evaluate_tag_scores, score_story};
use crate::domains::stories::data::StoryView;
use crate::domains::stories::errors::StoryError;
use crate::domains::stories::{EngagementCounter, Story};
use crate::kernel::ServerDeps;

/// Count a view by someone other than the author and refresh the scores it feeds
async fn record_view(story: &Story, deps: &ServerDeps) -> anyhow::Result<Story> {
    let store = deps.store.as_ref();
    let now = Utc::now();

    let Some(mut updated) = store
        .increment_story_counter(story.id, EngagementCounter::Views)
        .await?
    else {
        return Ok(story.clone());
    };

    updated.popularity_score = score_story(&updated, now);
    store
        .set_story_popularity(updated.id, updated.popularity_score)
        .await?;

    if !updated.tag_ids.is_empty() {
        for tag in store.record_tag_views(&updated.tag_ids).await? {
            store
                .save_tag_scores(tag.id, evaluate_tag_scores(&tag, now))
                .await?;
        }
    }

    Ok(updated)
}

/// Load a story for `viewer`, redacted unless they may see it in full
///
/// Unpublished stories are only visible to their author.
pub async fn get_story(
    story_id: StoryId,
    viewer: Option<MemberId>,
    deps: &ServerDeps,
) -> Result<StoryView, StoryError> {
    let story = deps
        .store
        .find_story(story_id)
        .await?
        .ok_or(StoryError::NotFound)?;

    let is_author = viewer.is_some_and(|id| story.is_author(id));
    if !story.is_published() && !is_author {
        return Err(StoryError::NotFound);
    }

    let story = if is_author {
        story
    } else {
        record_view(&story, deps).await?
    };

    let decision = can_view(&story, viewer, deps.store.as_ref()).await?;
    debug!(story_id = %story.id, unlocked = decision.unlocked, reason = %decision.reason, "Story read");

    let visible = if decision.unlocked { story } else { redact(&story) };
    Ok(StoryView::new(visible, decision))
}
