//! Swap lifecycle transitions.
//!
//! ```text
//! pending ──complete──▶ completed
//!    │  ▲
//! reject retry
//!    ▼  │
//! rejected
//!
//! pending | rejected ──expire──▶ expired
//! ```
//!
//! Pure functions over [`Swap`]. Persistence is the caller's job, using a
//! conditional update keyed on the status the transition started from.

use chrono::{DateTime, Utc};

use super::errors::{SwapError, SwapResult};
use super::models::{ModerationResults, Swap, SwapStatus, ValidationSnapshot};
use super::moderation::ModerationReport;
use super::validation::ValidationReport;
use crate::common::StoryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAction {
    Complete,
    Reject,
    Retry,
    Expire,
    Cancel,
}

impl SwapAction {
    pub fn name(self) -> &'static str {
        match self {
            SwapAction::Complete => "complete",
            SwapAction::Reject => "reject",
            SwapAction::Retry => "retry",
            SwapAction::Expire => "expire",
            SwapAction::Cancel => "cancel",
        }
    }
}

/// Status reached by applying `action` in `from`
pub fn next_status(from: SwapStatus, action: SwapAction) -> SwapResult<SwapStatus> {
    use SwapAction::*;
    use SwapStatus::*;

    match (from, action) {
        (Pending, Complete) => Ok(Completed),
        (Pending, Reject) => Ok(Rejected),
        (Rejected, Retry) => Ok(Pending),
        (Pending | Rejected, Expire) => Ok(Expired),
        // cancel deletes the swap; the status only gates it
        (Pending, Cancel) => Ok(Pending),
        _ => Err(SwapError::InvalidTransition {
            from,
            action: action.name(),
        }),
    }
}

fn elapsed_ms(swap: &Swap, now: DateTime<Utc>) -> i64 {
    (now - swap.timing.submitted_at).num_milliseconds().max(0)
}

/// Copy validator output into the swap's snapshot
pub fn record_validation(swap: &mut Swap, report: &ValidationReport) {
    swap.validation.content_length = report.content_length;
    swap.validation.has_location = report.has_location;
    swap.validation.has_media = report.has_media;
    swap.validation.violations = report.violations.clone();
}

/// Copy check outcomes into the snapshot and moderation results
pub fn record_moderation(swap: &mut Swap, report: &ModerationReport) {
    swap.validation.profanity_check = Some(report.profanity.passed);
    swap.validation.duplicate_check = Some(report.duplicate.passed);
    swap.validation.moderation_check = Some(report.patterns.passed);

    let flagged = !report.passed();
    swap.moderation = ModerationResults {
        flagged,
        reasons: report.reasons(),
        confidence: report.confidence(),
        review_required: flagged,
    };
}

/// Pending → completed, pointing at the materialized story
pub fn complete(swap: &mut Swap, submitted_story_id: StoryId, now: DateTime<Utc>) -> SwapResult<()> {
    swap.status = next_status(swap.status, SwapAction::Complete)?;
    swap.submitted_story_id = Some(submitted_story_id);
    swap.timing.processing_time_ms = Some(elapsed_ms(swap, now));
    swap.timing.unlocked_at = Some(now);
    swap.updated_at = now;
    Ok(())
}

/// Pending → rejected
pub fn reject(swap: &mut Swap, now: DateTime<Utc>) -> SwapResult<()> {
    swap.status = next_status(swap.status, SwapAction::Reject)?;
    swap.timing.processing_time_ms = Some(elapsed_ms(swap, now));
    swap.updated_at = now;
    Ok(())
}

/// Rejected → pending with every prior result cleared
///
/// `expires_at` is left as is. A logically expired swap cannot be retried.
pub fn reset_for_retry(swap: &mut Swap, now: DateTime<Utc>) -> SwapResult<()> {
    if swap.is_logically_expired(now) {
        return Err(SwapError::InvalidTransition {
            from: SwapStatus::Expired,
            action: SwapAction::Retry.name(),
        });
    }
    swap.status = next_status(swap.status, SwapAction::Retry)?;
    swap.validation = ValidationSnapshot::default();
    swap.moderation = ModerationResults::default();
    swap.timing.processing_time_ms = None;
    swap.updated_at = now;
    Ok(())
}

/// Pending or rejected → expired
pub fn expire(swap: &mut Swap, now: DateTime<Utc>) -> SwapResult<()> {
    swap.status = next_status(swap.status, SwapAction::Expire)?;
    swap.updated_at = now;
    Ok(())
}
