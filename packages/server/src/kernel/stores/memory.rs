use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::common::utils::calculate_distance_m;
use crate::common::{LocationId, MemberId, PageArgs, StoryId, SwapId, TagId};
use crate::domains::locations::{Location, NewLocation};
use crate::domains::member::{Member, MemberStatsDelta};
use crate::domains::stories::{EngagementCounter, Story};
use crate::domains::swaps::models::{Swap, SwapCounts, SwapStatus};
use crate::domains::tag::{Tag, TagScores};
use crate::kernel::traits::{
    BaseLocationStore, BaseMemberStore, BaseStoryStore, BaseSwapStore, BaseTagStore, StoryCorpus,
    SwapInsert,
};

#[derive(Default)]
struct MemoryState {
    members: HashMap<MemberId, Member>,
    stories: HashMap<StoryId, Story>,
    swaps: HashMap<SwapId, Swap>,
    locations: HashMap<LocationId, Location>,
    tags: HashMap<TagId, Tag>,
}

impl MemoryState {
    fn live_swap(&self, member_id: MemberId, story_id: StoryId) -> Option<&Swap> {
        self.swaps.values().find(|s| {
            s.member_id == member_id
                && s.story_to_unlock_id == story_id
                && s.status != SwapStatus::Expired
        })
    }
}

/// In-process store with the same atomicity guarantees as Postgres
///
/// A single lock guards all state, so check-then-insert on the swap slot is
/// atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_member(&self, member: Member) {
        self.state.write().await.members.insert(member.id, member);
    }

    pub async fn put_story(&self, story: Story) {
        self.state.write().await.stories.insert(story.id, story);
    }

    pub async fn put_swap(&self, swap: Swap) {
        self.state.write().await.swaps.insert(swap.id, swap);
    }

    pub async fn put_tag(&self, tag: Tag) {
        self.state.write().await.tags.insert(tag.id, tag);
    }

    pub async fn story_count(&self) -> usize {
        self.state.read().await.stories.len()
    }

    pub async fn swap_count(&self) -> usize {
        self.state.read().await.swaps.len()
    }

    pub async fn location_count(&self) -> usize {
        self.state.read().await.locations.len()
    }

    /// Every swap for the pair, expired ones included
    pub async fn swaps_for_pair(&self, member_id: MemberId, story_id: StoryId) -> Vec<Swap> {
        self.state
            .read()
            .await
            .swaps
            .values()
            .filter(|s| s.member_id == member_id && s.story_to_unlock_id == story_id)
            .cloned()
            .collect()
    }

    pub async fn find_tag_by_name(&self, name: &str) -> Option<Tag> {
        self.state
            .read()
            .await
            .tags
            .values()
            .find(|t| t.name == name)
            .cloned()
    }
}

#[async_trait]
impl StoryCorpus for MemoryStore {
    async fn published_text_contains(&self, needle: &str) -> Result<bool> {
        let needle = needle.to_lowercase();
        let state = self.state.read().await;
        Ok(state.stories.values().any(|story| {
            story.is_published()
                && story
                    .content
                    .text_body()
                    .is_some_and(|body| body.to_lowercase().contains(&needle))
        }))
    }
}

#[async_trait]
impl BaseStoryStore for MemoryStore {
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>> {
        Ok(self.state.read().await.stories.get(&id).cloned())
    }

    async fn insert_story(&self, story: &Story) -> Result<Story> {
        let mut state = self.state.write().await;
        if state.stories.contains_key(&story.id) {
            anyhow::bail!("story {} already exists", story.id);
        }
        state.stories.insert(story.id, story.clone());
        Ok(story.clone())
    }

    async fn increment_story_counter(
        &self,
        id: StoryId,
        counter: EngagementCounter,
    ) -> Result<Option<Story>> {
        let mut state = self.state.write().await;
        Ok(state.stories.get_mut(&id).map(|story| {
            story.engagement.increment(counter);
            story.updated_at = Utc::now();
            story.clone()
        }))
    }

    async fn set_story_popularity(&self, id: StoryId, score: i64) -> Result<()> {
        if let Some(story) = self.state.write().await.stories.get_mut(&id) {
            story.popularity_score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl BaseSwapStore for MemoryStore {
    async fn find_swap(&self, id: SwapId) -> Result<Option<Swap>> {
        Ok(self.state.read().await.swaps.get(&id).cloned())
    }

    async fn find_live_swap(&self, member_id: MemberId, story_id: StoryId) -> Result<Option<Swap>> {
        Ok(self
            .state
            .read()
            .await
            .live_swap(member_id, story_id)
            .cloned())
    }

    async fn insert_swap(&self, swap: &Swap) -> Result<SwapInsert> {
        let mut state = self.state.write().await;
        if swap.status != SwapStatus::Expired
            && state
                .live_swap(swap.member_id, swap.story_to_unlock_id)
                .is_some()
        {
            return Ok(SwapInsert::AlreadyExists);
        }
        state.swaps.insert(swap.id, swap.clone());
        Ok(SwapInsert::Inserted(swap.clone()))
    }

    async fn update_swap(&self, swap: &Swap, expected: SwapStatus) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.swaps.get_mut(&swap.id) {
            Some(stored) if stored.status == expected => {
                stored.status = swap.status;
                stored.submitted_story_id = swap.submitted_story_id;
                stored.validation = swap.validation.clone();
                stored.moderation = swap.moderation.clone();
                stored.timing.processing_time_ms = swap.timing.processing_time_ms;
                stored.timing.unlocked_at = swap.timing.unlocked_at;
                stored.updated_at = swap.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending_swap(&self, id: SwapId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.swaps.get(&id) {
            Some(swap) if swap.status == SwapStatus::Pending => {
                state.swaps.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_swaps(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut expired = 0;
        for swap in state.swaps.values_mut() {
            if swap.is_logically_expired(now) {
                swap.status = SwapStatus::Expired;
                swap.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn list_member_swaps(
        &self,
        member_id: MemberId,
        status: Option<SwapStatus>,
        page: PageArgs,
    ) -> Result<Vec<Swap>> {
        let state = self.state.read().await;
        let mut swaps: Vec<Swap> = state
            .swaps
            .values()
            .filter(|s| s.member_id == member_id && status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        swaps.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(swaps, page))
    }

    async fn list_review_queue(&self, page: PageArgs) -> Result<Vec<Swap>> {
        let state = self.state.read().await;
        let mut swaps: Vec<Swap> = state
            .swaps
            .values()
            .filter(|s| s.status == SwapStatus::Rejected && s.moderation.review_required)
            .cloned()
            .collect();
        swaps.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(paginate(swaps, page))
    }

    async fn swap_counts(&self, since: Option<DateTime<Utc>>) -> Result<SwapCounts> {
        let state = self.state.read().await;
        let mut counts = SwapCounts::default();
        for swap in state
            .swaps
            .values()
            .filter(|s| since.map_or(true, |since| s.created_at >= since))
        {
            counts.total += 1;
            match swap.status {
                SwapStatus::Completed => counts.completed += 1,
                SwapStatus::Pending => counts.pending += 1,
                SwapStatus::Rejected => counts.rejected += 1,
                SwapStatus::Expired => counts.expired += 1,
            }
        }
        Ok(counts)
    }
}

fn paginate<T>(items: Vec<T>, page: PageArgs) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

#[async_trait]
impl BaseLocationStore for MemoryStore {
    async fn find_location(&self, id: LocationId) -> Result<Option<Location>> {
        Ok(self.state.read().await.locations.get(&id).cloned())
    }

    async fn find_location_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<Location>> {
        let state = self.state.read().await;
        Ok(state
            .locations
            .values()
            .map(|l| (calculate_distance_m(latitude, longitude, l.latitude, l.longitude), l))
            .filter(|(distance, _)| *distance <= radius_m)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, l)| l.clone()))
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location> {
        let location = Location::from_new(location, Utc::now());
        self.state
            .write()
            .await
            .locations
            .insert(location.id, location.clone());
        Ok(location)
    }

    async fn record_location_story(
        &self,
        id: LocationId,
        at: DateTime<Utc>,
    ) -> Result<Option<Location>> {
        let mut state = self.state.write().await;
        Ok(state.locations.get_mut(&id).map(|location| {
            location.story_count += 1;
            location.last_story_at = Some(location.last_story_at.map_or(at, |prev| prev.max(at)));
            location.updated_at = Utc::now();
            location.clone()
        }))
    }

    async fn set_location_popularity(&self, id: LocationId, score: i64) -> Result<()> {
        if let Some(location) = self.state.write().await.locations.get_mut(&id) {
            location.popularity_score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl BaseTagStore for MemoryStore {
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn find_or_create_tag(&self, name: &str, display_name: &str) -> Result<Tag> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.tags.values().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let tag = Tag::new(name, display_name, Utc::now());
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn record_tag_story(&self, id: TagId) -> Result<Option<Tag>> {
        let mut state = self.state.write().await;
        Ok(state.tags.get_mut(&id).map(|tag| {
            tag.total_stories += 1;
            tag.active_stories += 1;
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn record_tag_views(&self, ids: &[TagId]) -> Result<Vec<Tag>> {
        let mut state = self.state.write().await;
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(tag) = state.tags.get_mut(id) {
                tag.total_views += 1;
                tag.updated_at = Utc::now();
                updated.push(tag.clone());
            }
        }
        Ok(updated)
    }

    async fn save_tag_scores(&self, id: TagId, scores: TagScores) -> Result<()> {
        if let Some(tag) = self.state.write().await.tags.get_mut(&id) {
            tag.apply_scores(scores);
        }
        Ok(())
    }
}

#[async_trait]
impl BaseMemberStore for MemoryStore {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }

    async fn increment_member_stats(&self, id: MemberId, delta: MemberStatsDelta) -> Result<()> {
        if let Some(member) = self.state.write().await.members.get_mut(&id) {
            member.stats.stories_published += delta.stories_published;
            member.stats.stories_unlocked += delta.stories_unlocked;
            member.stats.swaps_completed += delta.swaps_completed;
        }
        Ok(())
    }
}
