use tracing::info;

use crate::common::{Actor, SwapId};
use crate::domains::swaps::errors::{SwapError, SwapResult};
use crate::domains::swaps::machine::{next_status, SwapAction};
use crate::kernel::ServerDeps;

/// Owner withdraws a pending swap; the (member, story) slot is freed
pub async fn cancel_swap(swap_id: SwapId, actor: Actor, deps: &ServerDeps) -> SwapResult<()> {
    let store = deps.store.as_ref();
    let swap = store
        .find_swap(swap_id)
        .await?
        .ok_or(SwapError::NotFound("swap"))?;

    if !swap.is_owned_by(actor.id()) {
        return Err(SwapError::Forbidden(
            "only the member who requested a swap can cancel it".to_string(),
        ));
    }
    next_status(swap.status, SwapAction::Cancel)?;

    if !store.delete_pending_swap(swap_id).await? {
        let current = store
            .find_swap(swap_id)
            .await?
            .map(|s| s.status)
            .unwrap_or(swap.status);
        return Err(SwapError::InvalidTransition {
            from: current,
            action: SwapAction::Cancel.name(),
        });
    }

    info!(swap_id = %swap_id, member_id = %actor.id(), "Swap cancelled");
    Ok(())
}
