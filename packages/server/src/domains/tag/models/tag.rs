use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::TagId;

/// Tags beyond this many on a single story are dropped
pub const MAX_TAGS_PER_STORY: usize = 5;

/// Category assigned to tags created from user submissions
pub const DEFAULT_CATEGORY: &str = "general";

/// Tag attached to stories, keyed by its normalized name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,         // normalized: lowercase, no '#', single spaces
    pub display_name: String, // as first submitted
    pub category: String,
    pub is_official: bool,
    pub is_featured: bool,
    pub total_stories: i64,
    pub active_stories: i64,
    pub total_views: i64,
    pub popularity_score: i64,
    pub is_trending: bool,
    pub trending_since: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived fields written back after a recompute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagScores {
    pub popularity_score: i64,
    pub is_trending: bool,
    pub trending_since: Option<DateTime<Utc>>,
}

impl Tag {
    /// Unsaved user tag with zeroed counters
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: TagId::new(),
            name: name.into(),
            display_name: display_name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            is_official: false,
            is_featured: false,
            total_stories: 0,
            active_stories: 0,
            total_views: 0,
            popularity_score: 0,
            is_trending: false,
            trending_since: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_scores(&mut self, scores: TagScores) {
        self.popularity_score = scores.popularity_score;
        self.is_trending = scores.is_trending;
        self.trending_since = scores.trending_since;
    }
}

// =============================================================================
// Tag Queries
// =============================================================================

impl Tag {
    pub async fn find_by_id(id: TagId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find or create a tag by normalized name
    ///
    /// Concurrent callers creating the same name converge on one row.
    pub async fn find_or_create(name: &str, display_name: &str, pool: &PgPool) -> Result<Self> {
        let tag = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO tags (id, name, display_name, category)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(TagId::new())
        .bind(name)
        .bind(display_name)
        .bind(DEFAULT_CATEGORY)
        .fetch_one(pool)
        .await?;
        Ok(tag)
    }

    /// A new published story carries this tag
    pub async fn record_story(id: TagId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE tags SET
                total_stories = total_stories + 1,
                active_stories = active_stories + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// One view on a story carrying each of these tags
    pub async fn record_views(ids: &[TagId], pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE tags SET
                total_views = total_views + 1,
                updated_at = NOW()
            WHERE id = ANY($1)
            RETURNING *
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn save_scores(id: TagId, scores: TagScores, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tags SET
                popularity_score = $2,
                is_trending = $3,
                trending_since = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(scores.popularity_score)
        .bind(scores.is_trending)
        .bind(scores.trending_since)
        .execute(pool)
        .await?;
        Ok(())
    }
}
