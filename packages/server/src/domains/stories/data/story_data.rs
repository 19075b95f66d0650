use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LocationId, MemberId, StoryId, TagId};
use crate::domains::stories::activities::unlock::{UnlockDecision, UnlockReason};
use crate::domains::stories::{Engagement, Story, StoryContent, StoryStatus, SwapSettings};

/// A story as returned to a particular viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryView {
    pub id: StoryId,
    pub title: String,
    pub content: StoryContent,
    pub author_id: MemberId,
    pub location_id: Option<LocationId>,
    pub tag_ids: Vec<TagId>,
    pub status: StoryStatus,
    pub swap_settings: SwapSettings,
    pub engagement: Engagement,
    pub popularity_score: i64,
    pub published_at: Option<DateTime<Utc>>,
    /// Whether `content` is complete for this viewer
    pub unlocked: bool,
    pub unlock_reason: UnlockReason,
}

impl StoryView {
    pub fn new(story: Story, decision: UnlockDecision) -> Self {
        Self {
            id: story.id,
            title: story.title,
            content: story.content,
            author_id: story.author_id,
            location_id: story.location_id,
            tag_ids: story.tag_ids,
            status: story.status,
            swap_settings: story.swap_settings,
            engagement: story.engagement,
            popularity_score: story.popularity_score,
            published_at: story.published_at,
            unlocked: decision.unlocked,
            unlock_reason: decision.reason,
        }
    }
}
