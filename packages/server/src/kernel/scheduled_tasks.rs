//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (REAPER_CRON, default every 5 minutes)
//!     │
//!     └─► reap_expired_swaps(now)
//!             └─► pending/rejected swaps past expires_at → expired
//! ```
//!
//! The sweep is idempotent, so overlapping runs or several server replicas
//! sharing one database are harmless.

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::swaps::activities::reap_expired_swaps;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, reaper_cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reaper_deps = deps.clone();
    let reaper_job = Job::new_async(reaper_cron, move |_uuid, _lock| {
        let deps = reaper_deps.clone();
        Box::pin(async move {
            if let Err(e) = reap_expired_swaps(Utc::now(), &deps).await {
                tracing::error!(error = %e, "Swap reaper task failed");
            }
        })
    })?;

    scheduler.add(reaper_job).await?;
    scheduler.start().await?;

    tracing::info!(cron = %reaper_cron, "Scheduled tasks started (swap reaper)");
    Ok(scheduler)
}
