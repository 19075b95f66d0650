//! End-to-end swap lifecycle against the in-memory store
//!
//! Request → validate → moderate → materialize → complete, plus the
//! short-circuits, duplicate handling, concurrent requests and swaps that
//! change underneath their own review.

mod common;

use std::sync::Arc;

use async_trait::async_trait;

use crate::common::*;
use storyswap_core::common::{MemberId, StoryId};
use storyswap_core::domains::member::MemberRole;
use storyswap_core::domains::stories::{StorySubmission, SwapSettings};
use storyswap_core::domains::swaps::activities::request_unlock;
use storyswap_core::domains::swaps::moderation::{CheckOutcome, ContentCheck, ModerationPipeline};
use storyswap_core::domains::swaps::{SwapError, SwapStatus, UnlockStatus};
use storyswap_core::kernel::test_dependencies::{CountingCheck, FailingCheck};
use storyswap_core::kernel::{
    BaseMemberStore, BaseStore, BaseStoryStore, BaseSwapStore, MemoryStore, ServerDeps,
    StoryCorpus, TestDependencies,
};

#[tokio::test]
async fn qualifying_submission_completes_swap_and_publishes_story() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Completed);
    assert!(response.unlocked);
    assert!(response.errors.is_empty());

    let swap_id = response.swap_id.expect("swap id");
    let swap = test_deps.store.find_swap(swap_id).await.unwrap().unwrap();
    assert_eq!(swap.status, SwapStatus::Completed);
    assert!(swap.timing.unlocked_at.is_some());
    assert!(!swap.moderation.flagged);

    // The submission became a published, swap-gated story of its own
    let submitted_id = swap.submitted_story_id.expect("materialized story");
    let submitted = test_deps.store.find_story(submitted_id).await.unwrap().unwrap();
    assert!(submitted.is_published());
    assert_eq!(submitted.author_id, requester.id);
    assert_eq!(submitted.swap_settings, SwapSettings::default());
    assert_eq!(submitted.tag_ids.len(), 2);
    assert!(submitted.location_id.is_some());
    assert_eq!(test_deps.store.story_count().await, 2);

    let target = test_deps.store.find_story(target.id).await.unwrap().unwrap();
    assert_eq!(target.engagement.unlocks, 1);
    assert!(target.popularity_score > 0);

    let requester = test_deps.store.find_member(requester.id).await.unwrap().unwrap();
    assert_eq!(requester.stats.swaps_completed, 1);
    assert_eq!(requester.stats.stories_published, 1);
    assert_eq!(requester.stats.stories_unlocked, 1);
}

#[tokio::test]
async fn blocked_term_rejects_for_review_without_publishing() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(requester.id, target.id, submission_with_text(SPAM_TEXT), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Rejected);
    assert!(!response.unlocked);
    assert_eq!(response.message, "Submission is pending manual review");
    // Moderation reasons never reach the requester
    assert!(response.errors.is_empty());

    let swap = test_deps
        .store
        .find_swap(response.swap_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(swap.status, SwapStatus::Rejected);
    assert!(swap.moderation.review_required);
    assert!(swap.moderation.flagged);
    assert_eq!(swap.validation.profanity_check, Some(false));
    assert!(swap.submitted_story_id.is_none());

    assert_eq!(test_deps.store.story_count().await, 1);
    let target = test_deps.store.find_story(target.id).await.unwrap().unwrap();
    assert_eq!(target.engagement.unlocks, 0);
}

#[tokio::test]
async fn short_submission_is_rejected_before_moderation() {
    let counting = Arc::new(CountingCheck::new());
    let moderation = ModerationPipeline::default()
        .with_profanity(counting.clone())
        .with_duplicate(counting.clone())
        .with_patterns(counting.clone());
    let test_deps = TestDependencies::new().with_moderation(moderation);
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(
        requester.id,
        target.id,
        submission_with_text("Too short to count."),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(response.status, UnlockStatus::Rejected);
    assert!(response
        .errors
        .iter()
        .any(|e| e.starts_with("Content must be at least 50 characters")));
    assert_eq!(counting.calls(), 0);

    let swap = test_deps
        .store
        .find_swap(response.swap_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(swap.status, SwapStatus::Rejected);
    assert!(!swap.moderation.review_required);
    assert_eq!(swap.validation.content_length, 19);
}

#[tokio::test]
async fn missing_location_is_a_violation() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let submission = StorySubmission::builder()
        .title("No place")
        .text(QUALIFYING_TEXT)
        .build();
    let response = request_unlock(requester.id, target.id, submission, &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Rejected);
    assert_eq!(
        response.errors,
        vec!["A location with valid coordinates is required".to_string()]
    );
}

#[tokio::test]
async fn open_story_unlocks_without_a_swap() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let mut settings = gated();
    settings.requires_swap = false;
    let target = test_deps.seed_story(author.id, TARGET_BODY, settings).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Completed);
    assert!(response.unlocked);
    assert!(response.swap_id.is_none());
    assert_eq!(test_deps.store.swap_count().await, 0);
}

#[tokio::test]
async fn author_never_needs_a_swap() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(author.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert!(response.unlocked);
    assert_eq!(test_deps.store.swap_count().await, 0);
}

#[tokio::test]
async fn pending_swap_is_reported_not_duplicated() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let existing = pending_swap(requester.id, target.id);
    test_deps.store.put_swap(existing.clone()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Pending);
    assert_eq!(response.swap_id, Some(existing.id));
    assert_eq!(test_deps.store.swap_count().await, 1);
}

#[tokio::test]
async fn completed_swap_short_circuits_later_requests() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let first = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();
    let second = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(second.status, UnlockStatus::Completed);
    assert_eq!(second.swap_id, first.swap_id);
    assert_eq!(test_deps.store.swaps_for_pair(requester.id, target.id).await.len(), 1);
    // No second story was materialized
    assert_eq!(test_deps.store.story_count().await, 2);
}

#[tokio::test]
async fn rejected_swap_holds_the_slot() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let first = request_unlock(requester.id, target.id, submission_with_text("short"), &deps)
        .await
        .unwrap();
    let second = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(second.status, UnlockStatus::Rejected);
    assert_eq!(second.swap_id, first.swap_id);
    assert_eq!(second.errors, first.errors);
    assert_eq!(test_deps.store.swap_count().await, 1);
}

#[tokio::test]
async fn stale_swap_is_expired_and_replaced() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let mut stale = pending_swap(requester.id, target.id);
    stale.expires_at = chrono::Utc::now() - chrono::Duration::minutes(1);
    test_deps.store.put_swap(stale.clone()).await;
    let deps = test_deps.server_deps();

    let response = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Completed);
    assert_ne!(response.swap_id, Some(stale.id));

    let stale = test_deps.store.find_swap(stale.id).await.unwrap().unwrap();
    assert_eq!(stale.status, SwapStatus::Expired);
    assert_eq!(test_deps.store.swaps_for_pair(requester.id, target.id).await.len(), 2);
}

#[tokio::test]
async fn concurrent_requests_create_one_swap() {
    let moderation = ModerationPipeline::default().with_patterns(SlowCheck::new(50));
    let test_deps = TestDependencies::new().with_moderation(moderation);
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let (a, b) = tokio::join!(
        request_unlock(requester.id, target.id, qualifying_submission(), &deps),
        request_unlock(requester.id, target.id, qualifying_submission(), &deps),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let mut statuses = vec![a.status, b.status];
    statuses.sort_by_key(|s| format!("{:?}", s));
    assert_eq!(statuses, vec![UnlockStatus::Completed, UnlockStatus::Pending]);
    assert_eq!(a.swap_id, b.swap_id);

    let swaps = test_deps.store.swaps_for_pair(requester.id, target.id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].status, SwapStatus::Completed);
    assert_eq!(test_deps.store.story_count().await, 2);
}

#[tokio::test]
async fn raced_insert_reports_the_slot_holder() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;

    // Another request takes the slot between our lookup and our insert
    let rival = pending_swap(requester.id, target.id);
    let store = ScriptedStore::new(test_deps.store.clone()).with_rival(rival.clone());
    let deps = deps_over(Arc::new(store), &test_deps);

    let response = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Pending);
    assert!(!response.unlocked);
    assert_eq!(response.swap_id, Some(rival.id));

    let swaps = test_deps.store.swaps_for_pair(requester.id, target.id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].id, rival.id);
    assert_eq!(swaps[0].status, SwapStatus::Pending);
    assert_eq!(test_deps.store.story_count().await, 1);
}

#[tokio::test]
async fn storage_error_while_expiring_stale_swap_is_surfaced() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let mut stale = pending_swap(requester.id, target.id);
    stale.expires_at = chrono::Utc::now() - chrono::Duration::minutes(1);
    test_deps.store.put_swap(stale.clone()).await;

    let store = ScriptedStore::new(test_deps.store.clone()).failing_swap_updates();
    let deps = deps_over(Arc::new(store), &test_deps);

    let err = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::ProcessingFault(_)));
    let swaps = test_deps.store.swaps_for_pair(requester.id, target.id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].status, SwapStatus::Pending);
}

#[tokio::test]
async fn publish_failure_after_claim_rejects_swap() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;

    let store = ScriptedStore::new(test_deps.store.clone()).failing_story_inserts();
    let deps = deps_over(Arc::new(store), &test_deps);

    let err = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::ProcessingFault(_)));
    let swaps = test_deps.store.swaps_for_pair(requester.id, target.id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].status, SwapStatus::Rejected);
    assert!(swaps[0].submitted_story_id.is_none());
    assert_eq!(test_deps.store.story_count().await, 1);

    let target = test_deps.store.find_story(target.id).await.unwrap().unwrap();
    assert_eq!(target.engagement.unlocks, 0);
}

/// What happens to the pending swap while its checks are still running
enum Interference {
    OwnerCancels,
    Reaped,
}

struct InterferingCheck {
    store: Arc<MemoryStore>,
    member_id: MemberId,
    story_id: StoryId,
    interference: Interference,
}

#[async_trait]
impl ContentCheck for InterferingCheck {
    fn name(&self) -> &'static str {
        "interfering"
    }

    async fn run(&self, _: &StorySubmission, _: &dyn StoryCorpus) -> anyhow::Result<CheckOutcome> {
        match self.interference {
            Interference::OwnerCancels => {
                if let Some(swap) = self.store.find_live_swap(self.member_id, self.story_id).await? {
                    self.store.delete_pending_swap(swap.id).await?;
                }
            }
            Interference::Reaped => {
                self.store
                    .expire_swaps(chrono::Utc::now() + chrono::Duration::days(30))
                    .await?;
            }
        }
        Ok(CheckOutcome::pass())
    }
}

async fn request_with_interference(
    interference: Interference,
) -> (TestDependencies, MemberId, StoryId, SwapError) {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;

    let check = Arc::new(InterferingCheck {
        store: test_deps.store.clone(),
        member_id: requester.id,
        story_id: target.id,
        interference,
    });
    let test_deps = test_deps.with_moderation(ModerationPipeline::default().with_patterns(check));
    let deps = test_deps.server_deps();

    let err = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap_err();
    (test_deps, requester.id, target.id, err)
}

#[tokio::test]
async fn swap_cancelled_during_review_publishes_nothing() {
    let (test_deps, member_id, story_id, err) =
        request_with_interference(Interference::OwnerCancels).await;

    assert!(matches!(err, SwapError::ProcessingFault(_)));
    assert!(test_deps.store.swaps_for_pair(member_id, story_id).await.is_empty());
    assert_eq!(test_deps.store.story_count().await, 1);

    let target = test_deps.store.find_story(story_id).await.unwrap().unwrap();
    assert_eq!(target.engagement.unlocks, 0);
    let member = test_deps.store.find_member(member_id).await.unwrap().unwrap();
    assert_eq!(member.stats.stories_published, 0);
}

#[tokio::test]
async fn swap_reaped_during_review_publishes_nothing() {
    let (test_deps, member_id, story_id, err) =
        request_with_interference(Interference::Reaped).await;

    assert!(matches!(err, SwapError::ProcessingFault(_)));
    let swaps = test_deps.store.swaps_for_pair(member_id, story_id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].status, SwapStatus::Expired);
    assert!(swaps[0].submitted_story_id.is_none());
    assert_eq!(test_deps.store.story_count().await, 1);
}

/// Server deps over `store`, with the test deps' moderation and keys
fn deps_over(store: Arc<dyn BaseStore>, test_deps: &TestDependencies) -> ServerDeps {
    ServerDeps::new(
        store,
        test_deps.moderation.clone(),
        chrono::Duration::hours(24),
        test_deps.jwt_service.clone(),
    )
}

#[tokio::test]
async fn moderation_fault_rejects_and_surfaces_error() {
    let failing = Arc::new(FailingCheck::new());
    let moderation = ModerationPipeline::default().with_duplicate(failing.clone());
    let test_deps = TestDependencies::new().with_moderation(moderation);
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let err = request_unlock(requester.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::ProcessingFault(_)));
    assert_eq!(failing.calls(), 1);

    let swaps = test_deps.store.swaps_for_pair(requester.id, target.id).await;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].status, SwapStatus::Rejected);
    assert_eq!(test_deps.store.story_count().await, 1);
}

#[tokio::test]
async fn banned_member_cannot_request() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let mut banned = test_deps.seed_member(MemberRole::User).await;
    banned.is_banned = true;
    test_deps.store.put_member(banned.clone()).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    let err = request_unlock(banned.id, target.id, qualifying_submission(), &deps)
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::Forbidden(_)));
    assert_eq!(test_deps.store.swap_count().await, 0);
}

#[tokio::test]
async fn unknown_story_is_not_found() {
    let test_deps = TestDependencies::new();
    let requester = test_deps.seed_member(MemberRole::User).await;
    let deps = test_deps.server_deps();

    let err = request_unlock(
        requester.id,
        storyswap_core::common::StoryId::new(),
        qualifying_submission(),
        &deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SwapError::NotFound("story")));
}

#[tokio::test]
async fn resubmitting_published_text_is_flagged_as_duplicate() {
    let test_deps = TestDependencies::new();
    let author = test_deps.seed_member(MemberRole::User).await;
    let requester = test_deps.seed_member(MemberRole::User).await;
    let target = test_deps.seed_story(author.id, TARGET_BODY, gated()).await;
    let deps = test_deps.server_deps();

    // The target's own text, offered back as a submission
    let response = request_unlock(requester.id, target.id, submission_with_text(TARGET_BODY), &deps)
        .await
        .unwrap();

    assert_eq!(response.status, UnlockStatus::Rejected);
    let swap = test_deps
        .store
        .find_swap(response.swap_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(swap.validation.duplicate_check, Some(false));
    assert!(swap.moderation.review_required);
}
