// TestDependencies - in-memory wiring for tests
//
// Builds ServerDeps over a MemoryStore and offers seed helpers plus mock
// moderation checks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::stores::MemoryStore;
use super::traits::StoryCorpus;
use super::ServerDeps;
use crate::domains::auth::JwtService;
use crate::domains::member::{Member, MemberRole};
use crate::domains::stories::{NewStory, Story, StoryContent, StorySubmission, SwapSettings};
use crate::domains::swaps::models::DEFAULT_SWAP_TTL_HOURS;
use crate::domains::swaps::moderation::{CheckOutcome, ContentCheck, ModerationPipeline};

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "storyswap-test";

// =============================================================================
// Mock Content Checks
// =============================================================================

/// Check that always errors, for exercising processing faults
pub struct FailingCheck {
    calls: AtomicUsize,
}

impl FailingCheck {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentCheck for FailingCheck {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn run(&self, _: &StorySubmission, _: &dyn StoryCorpus) -> Result<CheckOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("moderation backend unavailable"))
    }
}

/// Check that passes and counts how often it ran
pub struct CountingCheck {
    calls: AtomicUsize,
}

impl CountingCheck {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CountingCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentCheck for CountingCheck {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn run(&self, _: &StorySubmission, _: &dyn StoryCorpus) -> Result<CheckOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckOutcome::pass())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub store: Arc<MemoryStore>,
    pub moderation: ModerationPipeline,
    pub jwt_service: Arc<JwtService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            moderation: ModerationPipeline::default(),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
        }
    }

    pub fn with_moderation(mut self, moderation: ModerationPipeline) -> Self {
        self.moderation = moderation;
        self
    }

    pub fn into_server_deps(self) -> ServerDeps {
        ServerDeps::new(
            self.store,
            self.moderation,
            Duration::hours(DEFAULT_SWAP_TTL_HOURS),
            self.jwt_service,
        )
    }

    /// Server deps sharing this store
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.moderation.clone(),
            Duration::hours(DEFAULT_SWAP_TTL_HOURS),
            self.jwt_service.clone(),
        )
    }

    pub async fn seed_member(&self, role: MemberRole) -> Member {
        let member = Member::new(role);
        self.store.put_member(member.clone()).await;
        member
    }

    /// Published story by `author_id` with the given settings
    pub async fn seed_story(
        &self,
        author_id: crate::common::MemberId,
        body: &str,
        swap_settings: SwapSettings,
    ) -> Story {
        let story = Story::publish(
            NewStory {
                title: "Seeded story".to_string(),
                content: StoryContent::from_parts(Some(body), Vec::new()),
                author_id,
                location_id: None,
                tag_ids: Vec::new(),
                swap_settings,
            },
            Utc::now(),
        );
        self.store.put_story(story.clone()).await;
        story
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
