//! Storage seams for the swap engine.
//!
//! Each store trait owns one table family. Anything that must hold under
//! concurrent requests (the one-live-swap-per-pair slot, status-guarded swap
//! updates, counter increments) is promised here and enforced by the
//! implementation, never re-checked by callers. `PostgresStore` backs the
//! server; `MemoryStore` gives tests the same guarantees in process.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{LocationId, MemberId, PageArgs, StoryId, SwapId, TagId};
use crate::domains::locations::{Location, NewLocation};
use crate::domains::member::{Member, MemberStatsDelta};
use crate::domains::stories::{EngagementCounter, Story};
use crate::domains::swaps::models::{Swap, SwapCounts, SwapStatus};
use crate::domains::tag::{Tag, TagScores};

// =============================================================================
// Story Corpus (read-only view used by duplicate detection)
// =============================================================================

#[async_trait]
pub trait StoryCorpus: Send + Sync {
    /// Whether any published story's text contains `needle`, ignoring case
    async fn published_text_contains(&self, needle: &str) -> Result<bool>;
}

// =============================================================================
// Story Store
// =============================================================================

#[async_trait]
pub trait BaseStoryStore: StoryCorpus {
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>>;

    async fn insert_story(&self, story: &Story) -> Result<Story>;

    /// Atomically add one to a counter; returns the updated story
    async fn increment_story_counter(
        &self,
        id: StoryId,
        counter: EngagementCounter,
    ) -> Result<Option<Story>>;

    async fn set_story_popularity(&self, id: StoryId, score: i64) -> Result<()>;
}

// =============================================================================
// Swap Store
// =============================================================================

/// Outcome of inserting into the (member, story) slot
#[derive(Debug, Clone)]
pub enum SwapInsert {
    Inserted(Swap),
    /// Another live swap won the race for the slot
    AlreadyExists,
}

#[async_trait]
pub trait BaseSwapStore: Send + Sync {
    async fn find_swap(&self, id: SwapId) -> Result<Option<Swap>>;

    /// The non-expired swap for this pair, if any
    async fn find_live_swap(&self, member_id: MemberId, story_id: StoryId) -> Result<Option<Swap>>;

    /// Atomic unique insert on (member, story) among non-expired swaps
    async fn insert_swap(&self, swap: &Swap) -> Result<SwapInsert>;

    /// Persist `swap` only if the stored status is still `expected`
    async fn update_swap(&self, swap: &Swap, expected: SwapStatus) -> Result<bool>;

    /// Delete a swap that is still pending
    async fn delete_pending_swap(&self, id: SwapId) -> Result<bool>;

    /// Mark open swaps past their deadline as expired; returns how many changed
    async fn expire_swaps(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn list_member_swaps(
        &self,
        member_id: MemberId,
        status: Option<SwapStatus>,
        page: PageArgs,
    ) -> Result<Vec<Swap>>;

    async fn list_review_queue(&self, page: PageArgs) -> Result<Vec<Swap>>;

    async fn swap_counts(&self, since: Option<DateTime<Utc>>) -> Result<SwapCounts>;
}

// =============================================================================
// Location Store
// =============================================================================

#[async_trait]
pub trait BaseLocationStore: Send + Sync {
    async fn find_location(&self, id: LocationId) -> Result<Option<Location>>;

    /// Closest existing location within `radius_m` metres
    async fn find_location_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<Location>>;

    async fn insert_location(&self, location: NewLocation) -> Result<Location>;

    /// Count one more story at this location
    async fn record_location_story(
        &self,
        id: LocationId,
        at: DateTime<Utc>,
    ) -> Result<Option<Location>>;

    async fn set_location_popularity(&self, id: LocationId, score: i64) -> Result<()>;
}

// =============================================================================
// Tag Store
// =============================================================================

#[async_trait]
pub trait BaseTagStore: Send + Sync {
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>>;

    /// Find by normalized name or create; concurrent creators converge on one tag
    async fn find_or_create_tag(&self, name: &str, display_name: &str) -> Result<Tag>;

    async fn record_tag_story(&self, id: TagId) -> Result<Option<Tag>>;

    async fn record_tag_views(&self, ids: &[TagId]) -> Result<Vec<Tag>>;

    async fn save_tag_scores(&self, id: TagId, scores: TagScores) -> Result<()>;
}

// =============================================================================
// Member Store
// =============================================================================

#[async_trait]
pub trait BaseMemberStore: Send + Sync {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Atomic increment of the member's stats counters
    async fn increment_member_stats(&self, id: MemberId, delta: MemberStatsDelta) -> Result<()>;
}

// =============================================================================
// Composite Store
// =============================================================================

/// Everything the swap engine reads and writes
pub trait BaseStore:
    BaseStoryStore + BaseSwapStore + BaseLocationStore + BaseTagStore + BaseMemberStore
{
    /// Upcast for callers that only need the corpus
    fn as_corpus(&self) -> &dyn StoryCorpus;
}

impl<T> BaseStore for T
where
    T: BaseStoryStore + BaseSwapStore + BaseLocationStore + BaseTagStore + BaseMemberStore,
{
    fn as_corpus(&self) -> &dyn StoryCorpus {
        self
    }
}
