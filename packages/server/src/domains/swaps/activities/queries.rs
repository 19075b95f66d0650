use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{Actor, AdminCapability, MemberId, PageArgs, SwapId};
use crate::domains::swaps::data::{SwapData, SwapStatsData};
use crate::domains::swaps::errors::{SwapError, SwapResult};
use crate::domains::swaps::models::SwapStatus;
use crate::kernel::ServerDeps;

/// Window for swap statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    #[default]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl Timeframe {
    /// Earliest `created_at` included, None for all time
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Timeframe::Day => Some(now - Duration::hours(24)),
            Timeframe::Week => Some(now - Duration::days(7)),
            Timeframe::Month => Some(now - Duration::days(30)),
            Timeframe::All => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Day => write!(f, "24h"),
            Timeframe::Week => write!(f, "7d"),
            Timeframe::Month => write!(f, "30d"),
            Timeframe::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "24h" => Ok(Timeframe::Day),
            "7d" => Ok(Timeframe::Week),
            "30d" => Ok(Timeframe::Month),
            "all" => Ok(Timeframe::All),
            _ => Err(anyhow::anyhow!("Invalid timeframe: {}", s)),
        }
    }
}

/// One swap, visible to its owner and to staff
pub async fn get_swap(swap_id: SwapId, actor: Actor, deps: &ServerDeps) -> SwapResult<SwapData> {
    let swap = deps
        .store
        .find_swap(swap_id)
        .await?
        .ok_or(SwapError::NotFound("swap"))?;

    if AdminCapability::ViewAnySwap.granted_to(actor.role()) {
        return Ok(SwapData::for_staff(swap));
    }
    if swap.is_owned_by(actor.id()) {
        return Ok(SwapData::for_owner(swap));
    }
    Err(SwapError::Forbidden(
        "swap belongs to another member".to_string(),
    ))
}

/// A member's swaps, newest first
pub async fn list_user_swaps(
    member_id: MemberId,
    status: Option<SwapStatus>,
    page: PageArgs,
    actor: Actor,
    deps: &ServerDeps,
) -> SwapResult<Vec<SwapData>> {
    if !actor.is_self_or(member_id, AdminCapability::ViewAnySwap) {
        return Err(SwapError::Forbidden(
            "cannot list another member's swaps".to_string(),
        ));
    }
    let staff = AdminCapability::ViewAnySwap.granted_to(actor.role());

    let swaps = deps
        .store
        .list_member_swaps(member_id, status, page.validate())
        .await?;
    Ok(swaps
        .into_iter()
        .map(|s| {
            if staff {
                SwapData::for_staff(s)
            } else {
                SwapData::for_owner(s)
            }
        })
        .collect())
}

pub async fn swap_stats(
    timeframe: Timeframe,
    actor: Actor,
    deps: &ServerDeps,
) -> SwapResult<SwapStatsData> {
    actor.can(AdminCapability::ViewSwapStats).check()?;
    let counts = deps.store.swap_counts(timeframe.since(Utc::now())).await?;
    Ok(SwapStatsData::from_counts(timeframe.to_string(), counts))
}

/// Rejected swaps flagged for review, newest first
pub async fn review_queue(
    page: PageArgs,
    actor: Actor,
    deps: &ServerDeps,
) -> SwapResult<Vec<SwapData>> {
    actor.can(AdminCapability::ReviewSwaps).check()?;
    let swaps = deps.store.list_review_queue(page.validate()).await?;
    Ok(swaps.into_iter().map(SwapData::for_staff).collect())
}
