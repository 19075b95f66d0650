use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{MemberId, StoryId, SwapId};
use crate::domains::swaps::models::{
    ModerationResults, Swap, SwapCounts, SwapStatus, SwapTiming, ValidationSnapshot,
};

/// Status reported back from an unlock request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStatus {
    Completed,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub status: UnlockStatus,
    pub unlocked: bool,
    pub swap_id: Option<SwapId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub message: String,
}

impl UnlockResponse {
    pub fn already_unlocked(swap_id: Option<SwapId>) -> Self {
        Self {
            status: UnlockStatus::Completed,
            unlocked: true,
            swap_id,
            errors: Vec::new(),
            message: "Story is already unlocked".to_string(),
        }
    }

    pub fn completed(swap_id: SwapId) -> Self {
        Self {
            status: UnlockStatus::Completed,
            unlocked: true,
            swap_id: Some(swap_id),
            errors: Vec::new(),
            message: "Swap completed, story unlocked".to_string(),
        }
    }

    pub fn pending(swap_id: Option<SwapId>) -> Self {
        Self {
            status: UnlockStatus::Pending,
            unlocked: false,
            swap_id,
            errors: Vec::new(),
            message: "A swap for this story is already in progress".to_string(),
        }
    }

    pub fn invalid(swap_id: SwapId, violations: Vec<String>) -> Self {
        Self {
            status: UnlockStatus::Rejected,
            unlocked: false,
            swap_id: Some(swap_id),
            errors: violations,
            message: "Submission does not meet the swap requirements".to_string(),
        }
    }

    pub fn under_review(swap_id: SwapId) -> Self {
        Self {
            status: UnlockStatus::Rejected,
            unlocked: false,
            swap_id: Some(swap_id),
            errors: Vec::new(),
            message: "Submission is pending manual review".to_string(),
        }
    }

    /// Response for a swap already sitting in `rejected`
    pub fn for_rejected(swap: &Swap) -> Self {
        if swap.validation.violations.is_empty() {
            Self::under_review(swap.id)
        } else {
            Self::invalid(swap.id, swap.validation.violations.clone())
        }
    }
}

/// A swap as shown through the API
///
/// Owners never see moderation reasons or confidence; staff do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapData {
    pub id: SwapId,
    pub member_id: MemberId,
    pub story_to_unlock_id: StoryId,
    pub submitted_story_id: Option<StoryId>,
    pub status: SwapStatus,
    pub validation: ValidationSnapshot,
    pub moderation: ModerationResults,
    pub timing: SwapTiming,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SwapData {
    pub fn for_staff(swap: Swap) -> Self {
        Self {
            id: swap.id,
            member_id: swap.member_id,
            story_to_unlock_id: swap.story_to_unlock_id,
            submitted_story_id: swap.submitted_story_id,
            status: swap.status,
            validation: swap.validation,
            moderation: swap.moderation,
            timing: swap.timing,
            expires_at: swap.expires_at,
            created_at: swap.created_at,
        }
    }

    pub fn for_owner(swap: Swap) -> Self {
        let mut data = Self::for_staff(swap);
        data.moderation.reasons.clear();
        data.moderation.confidence = None;
        data
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapStatsData {
    pub timeframe: String,
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub rejected: i64,
    pub expired: i64,
    /// Percentage of swaps completed, two decimals
    pub success_rate: f64,
}

impl SwapStatsData {
    pub fn from_counts(timeframe: impl Into<String>, counts: SwapCounts) -> Self {
        let success_rate = if counts.total == 0 {
            0.0
        } else {
            let pct = counts.completed as f64 / counts.total as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        };
        Self {
            timeframe: timeframe.into(),
            total: counts.total,
            completed: counts.completed,
            pending: counts.pending,
            rejected: counts.rejected,
            expired: counts.expired,
            success_rate,
        }
    }
}
