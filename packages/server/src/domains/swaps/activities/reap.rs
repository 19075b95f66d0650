use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::kernel::ServerDeps;

/// Expire every pending or rejected swap past its deadline
///
/// Idempotent: a second sweep at the same instant changes nothing.
pub async fn reap_expired_swaps(now: DateTime<Utc>, deps: &ServerDeps) -> Result<u64> {
    let expired = deps.store.expire_swaps(now).await?;
    if expired > 0 {
        info!(expired, "Reaped expired swaps");
    } else {
        debug!("No swaps to reap");
    }
    Ok(expired)
}
