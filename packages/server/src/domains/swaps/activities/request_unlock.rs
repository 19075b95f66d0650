use chrono::Utc;
use tracing::{debug, info};

use super::process::{process_swap, respond};
use crate::common::{MemberId, StoryId};
use crate::domains::stories::StorySubmission;
use crate::domains::swaps::data::UnlockResponse;
use crate::domains::swaps::errors::{SwapError, SwapResult};
use crate::domains::swaps::machine::expire;
use crate::domains::swaps::models::{Swap, SwapStatus};
use crate::kernel::traits::SwapInsert;
use crate::kernel::ServerDeps;

/// Ask to unlock `story_id` by submitting a story of one's own
///
/// Short-circuits, in order: story already open, requester is the author,
/// a completed swap exists, a swap is already pending. A swap past its
/// deadline is expired on the spot and a new one takes its slot. Otherwise
/// a pending swap is inserted and processed right away.
pub async fn request_unlock(
    member_id: MemberId,
    story_id: StoryId,
    submission: StorySubmission,
    deps: &ServerDeps,
) -> SwapResult<UnlockResponse> {
    let store = deps.store.as_ref();

    let member = store
        .find_member(member_id)
        .await?
        .ok_or_else(|| SwapError::Forbidden("unknown member".to_string()))?;
    if !member.in_good_standing() {
        return Err(SwapError::Forbidden(
            "account is not in good standing".to_string(),
        ));
    }

    let story = store
        .find_story(story_id)
        .await?
        .filter(|s| s.is_published())
        .ok_or(SwapError::NotFound("story"))?;

    if story.is_unlocked() || story.is_author(member_id) {
        return Ok(UnlockResponse::already_unlocked(None));
    }

    let now = Utc::now();
    if let Some(mut existing) = store.find_live_swap(member_id, story_id).await? {
        let status = existing.status;
        match status {
            SwapStatus::Completed => return Ok(UnlockResponse::already_unlocked(Some(existing.id))),
            _ if existing.is_logically_expired(now) => {
                expire(&mut existing, now)?;
                if store.update_swap(&existing, status).await? {
                    debug!(swap_id = %existing.id, "Expired stale swap before new request");
                } else {
                    // already expired or replaced by a concurrent request
                    debug!(swap_id = %existing.id, "Stale swap moved on before expiry");
                }
            }
            SwapStatus::Pending => return Ok(UnlockResponse::pending(Some(existing.id))),
            SwapStatus::Rejected => return Ok(UnlockResponse::for_rejected(&existing)),
            SwapStatus::Expired => {}
        }
    }

    let swap = Swap::new(member_id, story_id, submission, now, deps.swap_ttl);
    let swap = match insert_pending(&swap, deps).await {
        Ok(swap) => swap,
        Err(SwapError::DuplicateSwap { swap_id }) => {
            debug!(member_id = %member_id, story_id = %story_id, "Swap insert raced");
            return Ok(UnlockResponse::pending(swap_id));
        }
        Err(e) => return Err(e),
    };

    info!(swap_id = %swap.id, member_id = %member_id, story_id = %story_id, "Swap requested");
    let result = process_swap(swap.clone(), &story, deps).await;
    respond(result, &swap)
}

/// Claim the (member, story) slot or report who holds it
async fn insert_pending(swap: &Swap, deps: &ServerDeps) -> SwapResult<Swap> {
    let store = deps.store.as_ref();
    match store.insert_swap(swap).await? {
        SwapInsert::Inserted(inserted) => Ok(inserted),
        SwapInsert::AlreadyExists => {
            let holder = store
                .find_live_swap(swap.member_id, swap.story_to_unlock_id)
                .await?;
            Err(SwapError::DuplicateSwap {
                swap_id: holder.map(|h| h.id),
            })
        }
    }
}
