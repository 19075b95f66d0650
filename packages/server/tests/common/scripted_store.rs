//! Memory store wrapper with scripted swap-store behaviour.
//!
//! Delegates everything to a shared `MemoryStore`, except that it can
//! - hide the first live-slot lookup while a rival swap takes the slot, and
//! - fail every swap update or story insert with a storage error.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storyswap_core::common::{LocationId, MemberId, PageArgs, StoryId, SwapId, TagId};
use storyswap_core::domains::locations::{Location, NewLocation};
use storyswap_core::domains::member::{Member, MemberStatsDelta};
use storyswap_core::domains::stories::{EngagementCounter, Story};
use storyswap_core::domains::swaps::models::{Swap, SwapCounts, SwapStatus};
use storyswap_core::domains::tag::{Tag, TagScores};
use storyswap_core::kernel::{
    BaseLocationStore, BaseMemberStore, BaseStoryStore, BaseSwapStore, BaseTagStore, MemoryStore,
    StoryCorpus, SwapInsert,
};
use tokio::sync::Mutex;

pub struct ScriptedStore {
    inner: Arc<MemoryStore>,
    rival: Mutex<Option<Swap>>,
    fail_swap_updates: bool,
    fail_story_inserts: bool,
}

impl ScriptedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            rival: Mutex::new(None),
            fail_swap_updates: false,
            fail_story_inserts: false,
        }
    }

    /// The first live-slot lookup sees an empty slot, then `rival` lands in it
    pub fn with_rival(self, rival: Swap) -> Self {
        Self {
            rival: Mutex::new(Some(rival)),
            ..self
        }
    }

    pub fn failing_swap_updates(self) -> Self {
        Self {
            fail_swap_updates: true,
            ..self
        }
    }

    pub fn failing_story_inserts(self) -> Self {
        Self {
            fail_story_inserts: true,
            ..self
        }
    }
}

#[async_trait]
impl StoryCorpus for ScriptedStore {
    async fn published_text_contains(&self, needle: &str) -> Result<bool> {
        self.inner.published_text_contains(needle).await
    }
}

#[async_trait]
impl BaseStoryStore for ScriptedStore {
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>> {
        self.inner.find_story(id).await
    }

    async fn insert_story(&self, story: &Story) -> Result<Story> {
        if self.fail_story_inserts {
            anyhow::bail!("disk full while inserting story {}", story.id);
        }
        self.inner.insert_story(story).await
    }

    async fn increment_story_counter(
        &self,
        id: StoryId,
        counter: EngagementCounter,
    ) -> Result<Option<Story>> {
        self.inner.increment_story_counter(id, counter).await
    }

    async fn set_story_popularity(&self, id: StoryId, score: i64) -> Result<()> {
        self.inner.set_story_popularity(id, score).await
    }
}

#[async_trait]
impl BaseSwapStore for ScriptedStore {
    async fn find_swap(&self, id: SwapId) -> Result<Option<Swap>> {
        self.inner.find_swap(id).await
    }

    async fn find_live_swap(&self, member_id: MemberId, story_id: StoryId) -> Result<Option<Swap>> {
        if let Some(rival) = self.rival.lock().await.take() {
            self.inner.put_swap(rival).await;
            return Ok(None);
        }
        self.inner.find_live_swap(member_id, story_id).await
    }

    async fn insert_swap(&self, swap: &Swap) -> Result<SwapInsert> {
        self.inner.insert_swap(swap).await
    }

    async fn update_swap(&self, swap: &Swap, expected: SwapStatus) -> Result<bool> {
        if self.fail_swap_updates {
            anyhow::bail!("connection reset while updating swap {}", swap.id);
        }
        self.inner.update_swap(swap, expected).await
    }

    async fn delete_pending_swap(&self, id: SwapId) -> Result<bool> {
        self.inner.delete_pending_swap(id).await
    }

    async fn expire_swaps(&self, now: DateTime<Utc>) -> Result<u64> {
        self.inner.expire_swaps(now).await
    }

    async fn list_member_swaps(
        &self,
        member_id: MemberId,
        status: Option<SwapStatus>,
        page: PageArgs,
    ) -> Result<Vec<Swap>> {
        self.inner.list_member_swaps(member_id, status, page).await
    }

    async fn list_review_queue(&self, page: PageArgs) -> Result<Vec<Swap>> {
        self.inner.list_review_queue(page).await
    }

    async fn swap_counts(&self, since: Option<DateTime<Utc>>) -> Result<SwapCounts> {
        self.inner.swap_counts(since).await
    }
}

#[async_trait]
impl BaseLocationStore for ScriptedStore {
    async fn find_location(&self, id: LocationId) -> Result<Option<Location>> {
        self.inner.find_location(id).await
    }

    async fn find_location_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<Location>> {
        self.inner.find_location_near(latitude, longitude, radius_m).await
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location> {
        self.inner.insert_location(location).await
    }

    async fn record_location_story(
        &self,
        id: LocationId,
        at: DateTime<Utc>,
    ) -> Result<Option<Location>> {
        self.inner.record_location_story(id, at).await
    }

    async fn set_location_popularity(&self, id: LocationId, score: i64) -> Result<()> {
        self.inner.set_location_popularity(id, score).await
    }
}

#[async_trait]
impl BaseTagStore for ScriptedStore {
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>> {
        self.inner.find_tag(id).await
    }

    async fn find_or_create_tag(&self, name: &str, display_name: &str) -> Result<Tag> {
        self.inner.find_or_create_tag(name, display_name).await
    }

    async fn record_tag_story(&self, id: TagId) -> Result<Option<Tag>> {
        self.inner.record_tag_story(id).await
    }

    async fn record_tag_views(&self, ids: &[TagId]) -> Result<Vec<Tag>> {
        self.inner.record_tag_views(ids).await
    }

    async fn save_tag_scores(&self, id: TagId, scores: TagScores) -> Result<()> {
        self.inner.save_tag_scores(id, scores).await
    }
}

#[async_trait]
impl BaseMemberStore for ScriptedStore {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        self.inner.find_member(id).await
    }

    async fn increment_member_stats(&self, id: MemberId, delta: MemberStatsDelta) -> Result<()> {
        self.inner.increment_member_stats(id, delta).await
    }
}
