//! Validation and automated review of a pending swap.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::common::StoryId;
use crate::domains::member::MemberStatsDelta;
use crate::domains::scoring::score_story;
use crate::domains::stories::activities::materialize_submission;
use crate::domains::stories::{EngagementCounter, Story};
use crate::domains::swaps::data::UnlockResponse;
use crate::domains::swaps::errors::{SwapError, SwapResult};
use crate::domains::swaps::machine::{complete, record_moderation, record_validation, reject};
use crate::domains::swaps::models::{Swap, SwapStatus};
use crate::domains::swaps::validation::validate_submission;
use crate::kernel::ServerDeps;

/// Write a transition that started from `expected`
///
/// Fails when the stored swap moved on concurrently (cancelled, reaped).
pub(crate) async fn persist_transition(
    swap: &Swap,
    expected: SwapStatus,
    deps: &ServerDeps,
) -> SwapResult<()> {
    if deps.store.update_swap(swap, expected).await? {
        Ok(())
    } else {
        Err(SwapError::ProcessingFault(anyhow::anyhow!(
            "swap {} is no longer {}",
            swap.id,
            expected
        )))
    }
}

/// Run the content validator; violations reject the swap
pub async fn validate_swap(swap: &mut Swap, target: &Story, deps: &ServerDeps) -> SwapResult<()> {
    let report = validate_submission(&swap.submission, &target.swap_settings.requirements);
    record_validation(swap, &report);

    if report.is_valid() {
        return Ok(());
    }

    reject(swap, Utc::now())?;
    persist_transition(swap, SwapStatus::Pending, deps).await?;
    info!(
        swap_id = %swap.id,
        story_id = %target.id,
        violations = report.violations.len(),
        "Swap rejected by validation"
    );
    Err(SwapError::ValidationFailed {
        violations: report.violations,
    })
}

/// Target gains an unlock; the member gains a published story, an unlock and a completed swap
async fn credit_unlock(swap: &Swap, deps: &ServerDeps) -> SwapResult<()> {
    let store = deps.store.as_ref();
    if let Some(target) = store
        .increment_story_counter(swap.story_to_unlock_id, EngagementCounter::Unlocks)
        .await?
    {
        store
            .set_story_popularity(target.id, score_story(&target, Utc::now()))
            .await?;
    }
    store
        .increment_member_stats(swap.member_id, MemberStatsDelta::swap_completed())
        .await?;
    Ok(())
}

/// Moderation, then materialization and completion when everything passes
pub async fn run_automated_checks(swap: &mut Swap, deps: &ServerDeps) -> SwapResult<()> {
    let store = deps.store.as_ref();
    let report = deps.moderation.run(&swap.submission, store.as_corpus()).await?;
    record_moderation(swap, &report);

    if !report.passed() {
        reject(swap, Utc::now())?;
        persist_transition(swap, SwapStatus::Pending, deps).await?;
        warn!(
            swap_id = %swap.id,
            member_id = %swap.member_id,
            "Swap held for manual review"
        );
        return Err(SwapError::ModerationFailed { swap_id: swap.id });
    }

    // A story is published only for a swap this call moved to completed
    let claimed_from = swap.clone();
    let story_id = StoryId::new();
    complete(swap, story_id, Utc::now())?;
    persist_transition(swap, SwapStatus::Pending, deps).await?;

    let story = match materialize_submission(story_id, swap.member_id, &swap.submission, store).await
    {
        Ok(story) => story,
        Err(e) => {
            release_claim(claimed_from, deps).await;
            return Err(e.into());
        }
    };
    credit_unlock(swap, deps).await?;

    info!(
        swap_id = %swap.id,
        story_id = %swap.story_to_unlock_id,
        submitted_story_id = %story.id,
        "Swap completed"
    );
    Ok(())
}

/// Completed → rejected when the claimed story could not be published
async fn release_claim(mut pending: Swap, deps: &ServerDeps) {
    if reject(&mut pending, Utc::now()).is_err() {
        return;
    }
    match deps.store.update_swap(&pending, SwapStatus::Completed).await {
        Ok(true) => warn!(swap_id = %pending.id, "Released completion claim after publish failure"),
        Ok(false) => {}
        Err(e) => error!(swap_id = %pending.id, error = %e, "Could not release completion claim"),
    }
}

/// Reject after a fault, if the swap is still pending
async fn reject_after_fault(mut swap: Swap, deps: &ServerDeps) {
    if swap.status != SwapStatus::Pending || reject(&mut swap, Utc::now()).is_err() {
        return;
    }
    if let Err(e) = deps.store.update_swap(&swap, SwapStatus::Pending).await {
        warn!(swap_id = %swap.id, error = %e, "Could not reject swap after processing fault");
    }
}

/// Validate and review a pending swap end to end
///
/// Returns the completed swap. Validation and moderation failures come back
/// as their typed errors with the swap already rejected; any other fault
/// rejects the swap and is passed through.
pub async fn process_swap(mut swap: Swap, target: &Story, deps: &ServerDeps) -> SwapResult<Swap> {
    validate_swap(&mut swap, target, deps).await?;

    let snapshot = swap.clone();
    match run_automated_checks(&mut swap, deps).await {
        Ok(()) => Ok(swap),
        Err(SwapError::ProcessingFault(e)) => {
            error!(swap_id = %swap.id, error = %e, "Swap processing fault");
            reject_after_fault(snapshot, deps).await;
            Err(SwapError::ProcessingFault(e))
        }
        Err(other) => Err(other),
    }
}

/// Map a processing result onto the unlock response
pub(crate) fn respond(result: SwapResult<Swap>, swap: &Swap) -> SwapResult<UnlockResponse> {
    match result {
        Ok(completed) => Ok(UnlockResponse::completed(completed.id)),
        Err(SwapError::ValidationFailed { violations }) => {
            Ok(UnlockResponse::invalid(swap.id, violations))
        }
        Err(SwapError::ModerationFailed { swap_id }) => Ok(UnlockResponse::under_review(swap_id)),
        Err(other) => Err(other),
    }
}
