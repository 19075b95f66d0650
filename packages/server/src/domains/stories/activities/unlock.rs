//! Unlock decisions: who may see a story's full content.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::MemberId;
use crate::domains::stories::Story;
use crate::domains::swaps::models::SwapStatus;
use crate::kernel::traits::BaseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockReason {
    Author,
    NoSwapRequired,
    NotLocked,
    SwapCompleted,
    SwapRequired,
}

impl std::fmt::Display for UnlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnlockReason::Author => write!(f, "author"),
            UnlockReason::NoSwapRequired => write!(f, "no swap required"),
            UnlockReason::NotLocked => write!(f, "not locked"),
            UnlockReason::SwapCompleted => write!(f, "swap completed"),
            UnlockReason::SwapRequired => write!(f, "swap required"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockDecision {
    pub unlocked: bool,
    pub reason: UnlockReason,
}

impl UnlockDecision {
    pub fn open(reason: UnlockReason) -> Self {
        Self {
            unlocked: true,
            reason,
        }
    }
}

/// Pure decision given whether the viewer holds a completed swap
pub fn decide(story: &Story, viewer: Option<MemberId>, has_completed_swap: bool) -> UnlockDecision {
    if viewer.is_some_and(|id| story.is_author(id)) {
        return UnlockDecision::open(UnlockReason::Author);
    }
    if !story.swap_settings.requires_swap {
        return UnlockDecision::open(UnlockReason::NoSwapRequired);
    }
    if !story.swap_settings.is_locked {
        return UnlockDecision::open(UnlockReason::NotLocked);
    }
    if viewer.is_some() && has_completed_swap {
        return UnlockDecision::open(UnlockReason::SwapCompleted);
    }
    UnlockDecision {
        unlocked: false,
        reason: UnlockReason::SwapRequired,
    }
}

/// Decide for `viewer`, consulting storage only when a swap could matter
pub async fn can_view(
    story: &Story,
    viewer: Option<MemberId>,
    store: &dyn BaseStore,
) -> Result<UnlockDecision> {
    let pre = decide(story, viewer, false);
    if pre.unlocked {
        return Ok(pre);
    }
    let Some(member_id) = viewer else {
        return Ok(pre);
    };

    let completed = store
        .find_live_swap(member_id, story.id)
        .await?
        .is_some_and(|swap| swap.status == SwapStatus::Completed);

    Ok(decide(story, viewer, completed))
}

/// Copy of `story` fit for a viewer without access
pub fn redact(story: &Story) -> Story {
    let mut redacted = story.clone();
    redacted.content = story.content.redacted();
    redacted
}
