use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::MemberId;

/// Role assigned by the identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[default]
    User,
    Moderator,
    Admin,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::User => write!(f, "user"),
            MemberRole::Moderator => write!(f, "moderator"),
            MemberRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(MemberRole::User),
            "moderator" => Ok(MemberRole::Moderator),
            "admin" => Ok(MemberRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid member role: {}", s)),
        }
    }
}

/// Counters the engine increments as side effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberStats {
    pub stories_published: i64,
    pub stories_unlocked: i64,
    pub swaps_completed: i64,
}

/// Amounts to add to a member's stats in one atomic update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberStatsDelta {
    pub stories_published: i64,
    pub stories_unlocked: i64,
    pub swaps_completed: i64,
}

impl MemberStatsDelta {
    /// A direct publish
    pub fn published() -> Self {
        Self {
            stories_published: 1,
            ..Default::default()
        }
    }

    /// A completed swap: one story published, one unlocked
    pub fn swap_completed() -> Self {
        Self {
            stories_published: 1,
            stories_unlocked: 1,
            swaps_completed: 1,
        }
    }
}

/// Member as consumed by the swap engine
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub role: MemberRole,
    pub is_active: bool,
    pub is_banned: bool,
    #[sqlx(flatten)]
    pub stats: MemberStats,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// A fresh active member with the given role
    pub fn new(role: MemberRole) -> Self {
        Self {
            id: MemberId::new(),
            role,
            is_active: true,
            is_banned: false,
            stats: MemberStats::default(),
            created_at: Utc::now(),
        }
    }

    /// Active and not banned
    pub fn in_good_standing(&self) -> bool {
        self.is_active && !self.is_banned
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Member {
    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    /// Insert or refresh a member mirrored from the identity service
    pub async fn upsert(member: &Member, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (id, role, is_active, is_banned, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                role = EXCLUDED.role,
                is_active = EXCLUDED.is_active,
                is_banned = EXCLUDED.is_banned
            RETURNING *
            "#,
        )
        .bind(member.id)
        .bind(member.role)
        .bind(member.is_active)
        .bind(member.is_banned)
        .bind(member.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Atomically add `delta` to the member's stats
    pub async fn increment_stats(id: MemberId, delta: MemberStatsDelta, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE members SET
                stories_published = stories_published + $2,
                stories_unlocked = stories_unlocked + $3,
                swaps_completed = swaps_completed + $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta.stories_published)
        .bind(delta.stories_unlocked)
        .bind(delta.swaps_completed)
        .execute(pool)
        .await?;
        Ok(())
    }
}
