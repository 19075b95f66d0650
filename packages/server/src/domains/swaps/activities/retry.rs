use chrono::Utc;
use tracing::info;

use super::process::{persist_transition, process_swap, respond};
use crate::common::{Actor, AdminCapability, SwapId};
use crate::domains::swaps::data::UnlockResponse;
use crate::domains::swaps::errors::{SwapError, SwapResult};
use crate::domains::swaps::machine::reset_for_retry;
use crate::domains::swaps::models::SwapStatus;
use crate::kernel::ServerDeps;

/// Admin re-run of a rejected swap from scratch
///
/// Anything but a live `rejected` swap fails with `InvalidTransition` and
/// nothing is written.
pub async fn retry_swap(swap_id: SwapId, actor: Actor, deps: &ServerDeps) -> SwapResult<UnlockResponse> {
    actor.can(AdminCapability::RetrySwaps).check()?;

    let store = deps.store.as_ref();
    let mut swap = store
        .find_swap(swap_id)
        .await?
        .ok_or(SwapError::NotFound("swap"))?;
    let target = store
        .find_story(swap.story_to_unlock_id)
        .await?
        .ok_or(SwapError::NotFound("story"))?;

    reset_for_retry(&mut swap, Utc::now())?;
    persist_transition(&swap, SwapStatus::Rejected, deps).await?;
    info!(swap_id = %swap.id, admin_id = %actor.id(), "Swap retry requested");

    let result = process_swap(swap.clone(), &target, deps).await;
    respond(result, &swap)
}
