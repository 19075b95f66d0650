use tracing::info;

use super::materialize::publish_submission;
use crate::common::MemberId;
use crate::domains::member::MemberStatsDelta;
use crate::domains::stories::errors::StoryError;
use crate::domains::stories::{Story, StorySubmission, SwapSettings};
use crate::kernel::ServerDeps;

fn check_draft(submission: &StorySubmission) -> Vec<String> {
    let mut problems = Vec::new();
    if submission.title.trim().is_empty() {
        problems.push("Title is required".to_string());
    }
    if submission.trimmed_text().is_none() && !submission.has_media() {
        problems.push("A story needs text or media".to_string());
    }
    problems
}

/// Publish a story directly, with author-chosen swap settings
pub async fn publish_story(
    author_id: MemberId,
    submission: StorySubmission,
    swap_settings: SwapSettings,
    deps: &ServerDeps,
) -> Result<Story, StoryError> {
    let member = deps
        .store
        .find_member(author_id)
        .await?
        .ok_or_else(|| StoryError::Forbidden("unknown member".to_string()))?;
    if !member.in_good_standing() {
        return Err(StoryError::Forbidden("account is not in good standing".to_string()));
    }

    let problems = check_draft(&submission);
    if !problems.is_empty() {
        return Err(StoryError::Invalid(problems));
    }

    let store = deps.store.as_ref();
    let story = publish_submission(author_id, &submission, swap_settings, store).await?;
    store
        .increment_member_stats(author_id, MemberStatsDelta::published())
        .await?;

    info!(story_id = %story.id, author_id = %author_id, "Story published");
    Ok(story)
}
