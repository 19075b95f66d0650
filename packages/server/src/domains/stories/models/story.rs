use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use super::content::{ContentType, StoryContent};
use crate::common::{LocationId, MemberId, StoryId, TagId};

/// Default minimum length for a qualifying submission
pub const DEFAULT_MIN_CONTENT_LENGTH: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "story_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Draft,
    #[default]
    Published,
    Queued,
    Removed,
    Archived,
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryStatus::Draft => write!(f, "draft"),
            StoryStatus::Published => write!(f, "published"),
            StoryStatus::Queued => write!(f, "queued"),
            StoryStatus::Removed => write!(f, "removed"),
            StoryStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for StoryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(StoryStatus::Draft),
            "published" => Ok(StoryStatus::Published),
            "queued" => Ok(StoryStatus::Queued),
            "removed" => Ok(StoryStatus::Removed),
            "archived" => Ok(StoryStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid story status: {}", s)),
        }
    }
}

/// What a submission must satisfy to unlock a story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequirements {
    #[serde(default = "default_min_content_length")]
    pub min_content_length: u32,
    #[serde(default = "default_location_required")]
    pub location_required: bool,
    /// A submission needs at least one of these; empty accepts nothing
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<ContentType>,
}

fn default_min_content_length() -> u32 {
    DEFAULT_MIN_CONTENT_LENGTH
}

fn default_location_required() -> bool {
    true
}

fn default_allowed_content_types() -> Vec<ContentType> {
    vec![
        ContentType::Text,
        ContentType::Photo,
        ContentType::Audio,
        ContentType::Video,
    ]
}

impl Default for SwapRequirements {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            location_required: default_location_required(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SwapSettings {
    pub is_locked: bool,
    pub requires_swap: bool,
    #[sqlx(json)]
    #[serde(default)]
    pub requirements: SwapRequirements,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            is_locked: true,
            requires_swap: true,
            requirements: SwapRequirements::default(),
        }
    }
}

impl SwapSettings {
    /// Open to everyone
    pub fn open() -> Self {
        Self {
            is_locked: false,
            requires_swap: false,
            requirements: SwapRequirements::default(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        !self.is_locked || !self.requires_swap
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Engagement {
    pub views: i64,
    pub likes: i64,
    pub unlocks: i64,
    pub comments: i64,
    pub shares: i64,
    pub saves: i64,
}

/// A single engagement counter that can be bumped atomically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementCounter {
    Views,
    Likes,
    Unlocks,
    Comments,
    Shares,
    Saves,
}

impl EngagementCounter {
    pub fn column(self) -> &'static str {
        match self {
            EngagementCounter::Views => "views",
            EngagementCounter::Likes => "likes",
            EngagementCounter::Unlocks => "unlocks",
            EngagementCounter::Comments => "comments",
            EngagementCounter::Shares => "shares",
            EngagementCounter::Saves => "saves",
        }
    }
}

impl Engagement {
    pub fn increment(&mut self, counter: EngagementCounter) {
        match counter {
            EngagementCounter::Views => self.views += 1,
            EngagementCounter::Likes => self.likes += 1,
            EngagementCounter::Unlocks => self.unlocks += 1,
            EngagementCounter::Comments => self.comments += 1,
            EngagementCounter::Shares => self.shares += 1,
            EngagementCounter::Saves => self.saves += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[sqlx(json)]
    pub content: StoryContent,
    pub author_id: MemberId,
    pub location_id: Option<LocationId>,
    pub tag_ids: Vec<TagId>,
    pub status: StoryStatus,
    #[sqlx(flatten)]
    pub swap_settings: SwapSettings,
    #[sqlx(flatten)]
    pub engagement: Engagement,
    pub popularity_score: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a story about to be published
#[derive(Debug, Clone)]
pub struct NewStory {
    pub title: String,
    pub content: StoryContent,
    pub author_id: MemberId,
    pub location_id: Option<LocationId>,
    pub tag_ids: Vec<TagId>,
    pub swap_settings: SwapSettings,
}

impl Story {
    /// Unsaved published story with zeroed engagement
    pub fn publish(input: NewStory, now: DateTime<Utc>) -> Self {
        Self {
            id: StoryId::new(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
            location_id: input.location_id,
            tag_ids: input.tag_ids,
            status: StoryStatus::Published,
            swap_settings: input.swap_settings,
            engagement: Engagement::default(),
            popularity_score: 0,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == StoryStatus::Published
    }

    pub fn is_unlocked(&self) -> bool {
        self.swap_settings.is_unlocked()
    }

    pub fn is_author(&self, member_id: MemberId) -> bool {
        self.author_id == member_id
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Story {
    pub async fn find_by_id(id: StoryId, pool: &PgPool) -> Result<Option<Self>> {
        let story = sqlx::query_as::<_, Self>("SELECT * FROM stories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(story)
    }

    pub async fn insert(story: &Story, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO stories (
                id, title, content, text_body, author_id, location_id, tag_ids, status,
                is_locked, requires_swap, requirements,
                views, likes, unlocks, comments, shares, saves,
                popularity_score, published_at, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11,
                $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21
            )
            RETURNING *
            "#,
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(Json(&story.content))
        .bind(story.content.text_body())
        .bind(story.author_id)
        .bind(story.location_id)
        .bind(&story.tag_ids)
        .bind(story.status)
        .bind(story.swap_settings.is_locked)
        .bind(story.swap_settings.requires_swap)
        .bind(Json(&story.swap_settings.requirements))
        .bind(story.engagement.views)
        .bind(story.engagement.likes)
        .bind(story.engagement.unlocks)
        .bind(story.engagement.comments)
        .bind(story.engagement.shares)
        .bind(story.engagement.saves)
        .bind(story.popularity_score)
        .bind(story.published_at)
        .bind(story.created_at)
        .bind(story.updated_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Atomically add one to an engagement counter
    pub async fn increment_counter(
        id: StoryId,
        counter: EngagementCounter,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let column = counter.column();
        let sql = format!(
            "UPDATE stories SET {column} = {column} + 1, updated_at = NOW() WHERE id = $1 RETURNING *"
        );
        let story = sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(story)
    }

    pub async fn set_popularity(id: StoryId, score: i64, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE stories SET popularity_score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Whether any published story's text contains `needle`, ignoring case
    pub async fn published_text_contains(needle: &str, pool: &PgPool) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM stories
                WHERE status = 'published'
                  AND text_body IS NOT NULL
                  AND strpos(lower(text_body), lower($1)) > 0
            )
            "#,
        )
        .bind(needle)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
