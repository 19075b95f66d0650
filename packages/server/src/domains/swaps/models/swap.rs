use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{MemberId, PageArgs, StoryId, SwapId};
use crate::domains::stories::StorySubmission;

/// Default lifetime of a swap before the reaper expires it
pub const DEFAULT_SWAP_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "swap_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
    Expired,
}

impl SwapStatus {
    /// Completed and expired swaps never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, SwapStatus::Completed | SwapStatus::Expired)
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStatus::Pending => write!(f, "pending"),
            SwapStatus::Completed => write!(f, "completed"),
            SwapStatus::Rejected => write!(f, "rejected"),
            SwapStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for SwapStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SwapStatus::Pending),
            "completed" => Ok(SwapStatus::Completed),
            "rejected" => Ok(SwapStatus::Rejected),
            "expired" => Ok(SwapStatus::Expired),
            _ => Err(anyhow::anyhow!("Invalid swap status: {}", s)),
        }
    }
}

/// What the validator and the moderation checks saw
///
/// Check results stay `None` until the corresponding stage runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub content_length: u32,
    pub has_location: bool,
    pub has_media: bool,
    pub profanity_check: Option<bool>,
    pub duplicate_check: Option<bool>,
    pub moderation_check: Option<bool>,
    #[serde(default)]
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResults {
    pub flagged: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub confidence: Option<f64>,
    pub review_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SwapTiming {
    pub submitted_at: DateTime<Utc>,
    pub processing_time_ms: Option<i64>,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Swap {
    pub id: SwapId,
    pub member_id: MemberId,
    pub story_to_unlock_id: StoryId,
    pub submitted_story_id: Option<StoryId>,
    pub status: SwapStatus,
    #[sqlx(json)]
    pub submission: StorySubmission,
    #[sqlx(json)]
    pub validation: ValidationSnapshot,
    #[sqlx(json)]
    pub moderation: ModerationResults,
    #[sqlx(flatten)]
    pub timing: SwapTiming,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts over a time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SwapCounts {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub rejected: i64,
    pub expired: i64,
}

impl Swap {
    /// A fresh pending swap holding `submission`
    pub fn new(
        member_id: MemberId,
        story_to_unlock_id: StoryId,
        submission: StorySubmission,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: SwapId::new(),
            member_id,
            story_to_unlock_id,
            submitted_story_id: None,
            status: SwapStatus::Pending,
            submission,
            validation: ValidationSnapshot::default(),
            moderation: ModerationResults::default(),
            timing: SwapTiming {
                submitted_at: now,
                processing_time_ms: None,
                unlocked_at: None,
            },
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    /// Past `expires_at` while still open, whether or not the reaper has run
    pub fn is_logically_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, SwapStatus::Pending | SwapStatus::Rejected) && self.expires_at < now
    }

    pub fn is_owned_by(&self, member_id: MemberId) -> bool {
        self.member_id == member_id
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Swap {
    pub async fn find_by_id(id: SwapId, pool: &PgPool) -> Result<Option<Self>> {
        let swap = sqlx::query_as::<_, Self>("SELECT * FROM swaps WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(swap)
    }

    /// The swap occupying the (member, story) slot, if any
    pub async fn find_live(
        member_id: MemberId,
        story_id: StoryId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let swap = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM swaps
            WHERE member_id = $1 AND story_to_unlock_id = $2 AND status <> 'expired'
            "#,
        )
        .bind(member_id)
        .bind(story_id)
        .fetch_optional(pool)
        .await?;
        Ok(swap)
    }

    /// Insert unless the (member, story) slot is taken
    ///
    /// Returns `None` when another live swap already holds the slot.
    pub async fn insert_if_vacant(swap: &Swap, pool: &PgPool) -> Result<Option<Self>> {
        let inserted = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO swaps (
                id, member_id, story_to_unlock_id, submitted_story_id, status,
                submission, validation, moderation,
                submitted_at, processing_time_ms, unlocked_at,
                expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (member_id, story_to_unlock_id) WHERE status <> 'expired' DO NOTHING
            RETURNING *
            "#,
        )
        .bind(swap.id)
        .bind(swap.member_id)
        .bind(swap.story_to_unlock_id)
        .bind(swap.submitted_story_id)
        .bind(swap.status)
        .bind(Json(&swap.submission))
        .bind(Json(&swap.validation))
        .bind(Json(&swap.moderation))
        .bind(swap.timing.submitted_at)
        .bind(swap.timing.processing_time_ms)
        .bind(swap.timing.unlocked_at)
        .bind(swap.expires_at)
        .bind(swap.created_at)
        .bind(swap.updated_at)
        .fetch_optional(pool)
        .await?;
        Ok(inserted)
    }

    /// Write `swap` back only if the stored status still equals `expected`
    pub async fn update_if_status(swap: &Swap, expected: SwapStatus, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE swaps SET
                status = $2,
                submitted_story_id = $3,
                validation = $4,
                moderation = $5,
                processing_time_ms = $6,
                unlocked_at = $7,
                updated_at = $8
            WHERE id = $1 AND status = $9
            "#,
        )
        .bind(swap.id)
        .bind(swap.status)
        .bind(swap.submitted_story_id)
        .bind(Json(&swap.validation))
        .bind(Json(&swap.moderation))
        .bind(swap.timing.processing_time_ms)
        .bind(swap.timing.unlocked_at)
        .bind(swap.updated_at)
        .bind(expected)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_if_pending(id: SwapId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM swaps WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Expire every open swap whose deadline has passed
    pub async fn expire_due(now: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE swaps SET status = 'expired', updated_at = $1
            WHERE status IN ('pending', 'rejected') AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_member(
        member_id: MemberId,
        status: Option<SwapStatus>,
        page: PageArgs,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let swaps = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM swaps
            WHERE member_id = $1 AND ($2::swap_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(member_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
        Ok(swaps)
    }

    /// Rejected swaps waiting on a human, newest first
    pub async fn list_review_queue(page: PageArgs, pool: &PgPool) -> Result<Vec<Self>> {
        let swaps = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM swaps
            WHERE status = 'rejected'
              AND (moderation->>'review_required')::boolean IS TRUE
            ORDER BY updated_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
        Ok(swaps)
    }

    /// Counts by status for swaps created at or after `since`
    pub async fn count_since(since: Option<DateTime<Utc>>, pool: &PgPool) -> Result<SwapCounts> {
        let counts = sqlx::query_as::<_, SwapCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE status = 'expired') AS expired
            FROM swaps
            WHERE $1::timestamptz IS NULL OR created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }
}
