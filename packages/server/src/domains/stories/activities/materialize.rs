//! Turning a submission into a published story.
//!
//! Shared by swap completion and direct authoring: both resolve the
//! location and tags the same way and refresh the same counters and scores.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::common::utils::{normalize_tag_name, SAME_LOCATION_RADIUS_METERS};
use crate::common::{LocationId, MemberId, StoryId, TagId};
use crate::domains::scoring::{evaluate_tag_scores, location_score, score_story};
use crate::domains::stories::{NewStory, Story, StorySubmission, SwapSettings};
use crate::domains::tag::MAX_TAGS_PER_STORY;
use crate::kernel::traits::BaseStore;

/// Existing location within the same-place radius, or a new one
pub async fn resolve_location(
    submission: &StorySubmission,
    store: &dyn BaseStore,
) -> Result<Option<LocationId>> {
    let Some(new_location) = submission.location.as_ref().and_then(|l| l.to_new_location()) else {
        return Ok(None);
    };

    if let Some(existing) = store
        .find_location_near(
            new_location.latitude,
            new_location.longitude,
            SAME_LOCATION_RADIUS_METERS,
        )
        .await?
    {
        debug!(location_id = %existing.id, "Reusing nearby location");
        return Ok(Some(existing.id));
    }

    let created = store.insert_location(new_location).await?;
    debug!(location_id = %created.id, "Created location");
    Ok(Some(created.id))
}

/// Normalized, de-duplicated tag names with their first display form
pub fn normalize_tags(raw: &[String]) -> Vec<(String, String)> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for tag in raw {
        let Some(name) = normalize_tag_name(tag) else {
            continue;
        };
        if seen.iter().any(|(n, _)| *n == name) {
            continue;
        }
        let display = tag.trim().trim_start_matches('#').trim().to_string();
        seen.push((name, display));
        if seen.len() == MAX_TAGS_PER_STORY {
            break;
        }
    }
    seen
}

pub async fn resolve_tags(raw: &[String], store: &dyn BaseStore) -> Result<Vec<TagId>> {
    let mut ids = Vec::new();
    for (name, display) in normalize_tags(raw) {
        let tag = store.find_or_create_tag(&name, &display).await?;
        ids.push(tag.id);
    }
    Ok(ids)
}

/// Bump location and tag counters for a new story and rescore them
async fn attach_counters(story: &Story, store: &dyn BaseStore, now: DateTime<Utc>) -> Result<()> {
    if let Some(location_id) = story.location_id {
        if let Some(location) = store.record_location_story(location_id, now).await? {
            let score = location_score(location.story_count, location.last_story_at, now);
            store.set_location_popularity(location_id, score).await?;
        }
    }

    for tag_id in &story.tag_ids {
        if let Some(tag) = store.record_tag_story(*tag_id).await? {
            store
                .save_tag_scores(*tag_id, evaluate_tag_scores(&tag, now))
                .await?;
        }
    }

    Ok(())
}

/// Publish `submission` as a story by `author_id`
///
/// Member stats are left to the caller.
pub async fn publish_submission(
    author_id: MemberId,
    submission: &StorySubmission,
    swap_settings: SwapSettings,
    store: &dyn BaseStore,
) -> Result<Story> {
    insert_published(StoryId::new(), author_id, submission, swap_settings, store).await
}

async fn insert_published(
    story_id: StoryId,
    author_id: MemberId,
    submission: &StorySubmission,
    swap_settings: SwapSettings,
    store: &dyn BaseStore,
) -> Result<Story> {
    let now = Utc::now();
    let location_id = resolve_location(submission, store).await?;
    let tag_ids = resolve_tags(&submission.tags, store).await?;

    let mut story = Story::publish(
        NewStory {
            title: submission.title.trim().to_string(),
            content: submission.to_content(),
            author_id,
            location_id,
            tag_ids,
            swap_settings,
        },
        now,
    );
    story.id = story_id;
    story.popularity_score = score_story(&story, now);

    let story = store.insert_story(&story).await?;
    attach_counters(&story, store, now).await?;

    debug!(story_id = %story.id, author_id = %author_id, "Published story");
    Ok(story)
}

/// Story for an approved swap submission: locked and swap-gated
///
/// `story_id` is the id the completed swap already points at.
pub async fn materialize_submission(
    story_id: StoryId,
    member_id: MemberId,
    submission: &StorySubmission,
    store: &dyn BaseStore,
) -> Result<Story> {
    insert_published(story_id, member_id, submission, SwapSettings::default(), store).await
}
