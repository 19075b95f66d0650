//! Test fixtures for building submissions, stories and swaps.
//!
//! Everything here works against the in-memory store through
//! `TestDependencies`; the Postgres tests seed through the model methods.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use storyswap_core::common::{Actor, MemberId, StoryId};
use storyswap_core::domains::member::{Member, MemberRole};
use storyswap_core::domains::stories::{StorySubmission, SubmittedLocation, SwapSettings};
use storyswap_core::domains::swaps::models::Swap;
use storyswap_core::domains::swaps::moderation::{CheckOutcome, ContentCheck};
use storyswap_core::kernel::StoryCorpus;

/// 80 characters, no blocked terms, no flagged patterns
pub const QUALIFYING_TEXT: &str =
    "The bakery on the corner opened at dawn and the street smelled of warm rye bread";

/// Long enough to validate, but carries a blocked term
pub const SPAM_TEXT: &str =
    "This is spam content dressed up as a story about the harbour at night, honestly.";

pub const TARGET_BODY: &str =
    "Under the old bridge there is a door nobody opens, and one night I opened it.";

pub fn minneapolis() -> SubmittedLocation {
    SubmittedLocation::builder()
        .latitude(44.9778)
        .longitude(-93.2650)
        .city("Minneapolis")
        .build()
}

/// Submission that passes default requirements and moderation
pub fn qualifying_submission() -> StorySubmission {
    StorySubmission::builder()
        .title("Morning bread")
        .text(QUALIFYING_TEXT)
        .location(minneapolis())
        .tags(vec!["#Food".to_string(), "mornings".to_string()])
        .build()
}

pub fn submission_with_text(text: &str) -> StorySubmission {
    StorySubmission::builder()
        .title("A story")
        .text(text)
        .location(minneapolis())
        .build()
}

pub fn actor(member: &Member) -> Actor {
    Actor::new(member.id, member.role)
}

pub fn admin_actor() -> Actor {
    Actor::new(MemberId::new(), MemberRole::Admin)
}

/// Swap row in a given state, not yet processed
pub fn pending_swap(member_id: MemberId, story_id: StoryId) -> Swap {
    Swap::new(
        member_id,
        story_id,
        qualifying_submission(),
        Utc::now(),
        Duration::hours(24),
    )
}

/// Locked, swap-gated settings with default requirements
pub fn gated() -> SwapSettings {
    SwapSettings::default()
}

/// Passing check that sleeps first, so concurrent requests interleave
pub struct SlowCheck {
    delay: StdDuration,
}

impl SlowCheck {
    pub fn new(delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            delay: StdDuration::from_millis(delay_ms),
        })
    }
}

#[async_trait]
impl ContentCheck for SlowCheck {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn run(&self, _: &StorySubmission, _: &dyn StoryCorpus) -> Result<CheckOutcome> {
        tokio::time::sleep(self.delay).await;
        Ok(CheckOutcome::pass())
    }
}
