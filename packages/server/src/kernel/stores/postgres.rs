use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

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

/// Postgres-backed store; every query lives on the domain models
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StoryCorpus for PostgresStore {
    async fn published_text_contains(&self, needle: &str) -> Result<bool> {
        Story::published_text_contains(needle, &self.pool).await
    }
}

#[async_trait]
impl BaseStoryStore for PostgresStore {
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>> {
        Story::find_by_id(id, &self.pool).await
    }

    async fn insert_story(&self, story: &Story) -> Result<Story> {
        Story::insert(story, &self.pool).await
    }

    async fn increment_story_counter(
        &self,
        id: StoryId,
        counter: EngagementCounter,
    ) -> Result<Option<Story>> {
        Story::increment_counter(id, counter, &self.pool).await
    }

    async fn set_story_popularity(&self, id: StoryId, score: i64) -> Result<()> {
        Story::set_popularity(id, score, &self.pool).await
    }
}

#[async_trait]
impl BaseSwapStore for PostgresStore {
    async fn find_swap(&self, id: SwapId) -> Result<Option<Swap>> {
        Swap::find_by_id(id, &self.pool).await
    }

    async fn find_live_swap(&self, member_id: MemberId, story_id: StoryId) -> Result<Option<Swap>> {
        Swap::find_live(member_id, story_id, &self.pool).await
    }

    async fn insert_swap(&self, swap: &Swap) -> Result<SwapInsert> {
        Ok(match Swap::insert_if_vacant(swap, &self.pool).await? {
            Some(inserted) => SwapInsert::Inserted(inserted),
            None => SwapInsert::AlreadyExists,
        })
    }

    async fn update_swap(&self, swap: &Swap, expected: SwapStatus) -> Result<bool> {
        Swap::update_if_status(swap, expected, &self.pool).await
    }

    async fn delete_pending_swap(&self, id: SwapId) -> Result<bool> {
        Swap::delete_if_pending(id, &self.pool).await
    }

    async fn expire_swaps(&self, now: DateTime<Utc>) -> Result<u64> {
        Swap::expire_due(now, &self.pool).await
    }

    async fn list_member_swaps(
        &self,
        member_id: MemberId,
        status: Option<SwapStatus>,
        page: PageArgs,
    ) -> Result<Vec<Swap>> {
        Swap::list_for_member(member_id, status, page, &self.pool).await
    }

    async fn list_review_queue(&self, page: PageArgs) -> Result<Vec<Swap>> {
        Swap::list_review_queue(page, &self.pool).await
    }

    async fn swap_counts(&self, since: Option<DateTime<Utc>>) -> Result<SwapCounts> {
        Swap::count_since(since, &self.pool).await
    }
}

#[async_trait]
impl BaseLocationStore for PostgresStore {
    async fn find_location(&self, id: LocationId) -> Result<Option<Location>> {
        Location::find_by_id(id, &self.pool).await
    }

    async fn find_location_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<Location>> {
        Location::find_nearest_within(latitude, longitude, radius_m, &self.pool).await
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location> {
        Location::insert(&Location::from_new(location, Utc::now()), &self.pool).await
    }

    async fn record_location_story(
        &self,
        id: LocationId,
        at: DateTime<Utc>,
    ) -> Result<Option<Location>> {
        Location::record_story(id, at, &self.pool).await
    }

    async fn set_location_popularity(&self, id: LocationId, score: i64) -> Result<()> {
        Location::set_popularity(id, score, &self.pool).await
    }
}

#[async_trait]
impl BaseTagStore for PostgresStore {
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>> {
        Tag::find_by_id(id, &self.pool).await
    }

    async fn find_or_create_tag(&self, name: &str, display_name: &str) -> Result<Tag> {
        Tag::find_or_create(name, display_name, &self.pool).await
    }

    async fn record_tag_story(&self, id: TagId) -> Result<Option<Tag>> {
        Tag::record_story(id, &self.pool).await
    }

    async fn record_tag_views(&self, ids: &[TagId]) -> Result<Vec<Tag>> {
        Tag::record_views(ids, &self.pool).await
    }

    async fn save_tag_scores(&self, id: TagId, scores: TagScores) -> Result<()> {
        Tag::save_scores(id, scores, &self.pool).await
    }
}

#[async_trait]
impl BaseMemberStore for PostgresStore {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Member::find_by_id(id, &self.pool).await
    }

    async fn increment_member_stats(&self, id: MemberId, delta: MemberStatsDelta) -> Result<()> {
        Member::increment_stats(id, delta, &self.pool).await
    }
}
