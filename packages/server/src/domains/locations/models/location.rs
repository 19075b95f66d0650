use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::LocationId;

/// A physical place stories are told about
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: LocationId,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub story_count: i64,
    pub popularity_score: i64,
    pub last_story_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Coordinates and address fields for a location that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl Location {
    /// Build an unsaved location with zeroed counters
    pub fn from_new(input: NewLocation, now: DateTime<Utc>) -> Self {
        Self {
            id: LocationId::new(),
            latitude: input.latitude,
            longitude: input.longitude,
            address: input.address,
            city: input.city,
            region: input.region,
            country: input.country,
            postal_code: input.postal_code,
            story_count: 0,
            popularity_score: 0,
            last_story_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Location {
    pub async fn find_by_id(id: LocationId, pool: &PgPool) -> Result<Option<Self>> {
        let location = sqlx::query_as::<_, Self>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(location)
    }

    /// Closest location within `radius_m` metres of the given point
    ///
    /// A degree box narrows the scan before the haversine distance is computed.
    pub async fn find_nearest_within(
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let lat_delta = radius_m / 111_320.0;
        let location = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM (
                SELECT l.*,
                    6371000.0 * 2.0 * asin(sqrt(
                        power(sin(radians(l.latitude - $1) / 2.0), 2)
                        + cos(radians($1)) * cos(radians(l.latitude))
                        * power(sin(radians(l.longitude - $2) / 2.0), 2)
                    )) AS distance_m
                FROM locations l
                WHERE l.latitude BETWEEN $1 - $4 AND $1 + $4
            ) candidates
            WHERE distance_m <= $3
            ORDER BY distance_m ASC
            LIMIT 1
            "#,
        )
        .bind(latitude)
        .bind(longitude)
        .bind(radius_m)
        .bind(lat_delta)
        .fetch_optional(pool)
        .await?;
        Ok(location)
    }

    pub async fn insert(location: &Location, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO locations (
                id, latitude, longitude, address, city, region, country, postal_code,
                story_count, popularity_score, last_story_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(location.id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.address)
        .bind(&location.city)
        .bind(&location.region)
        .bind(&location.country)
        .bind(&location.postal_code)
        .bind(location.story_count)
        .bind(location.popularity_score)
        .bind(location.last_story_at)
        .bind(location.created_at)
        .bind(location.updated_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Count one more story and move `last_story_at` forward
    pub async fn record_story(
        id: LocationId,
        at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let location = sqlx::query_as::<_, Self>(
            r#"
            UPDATE locations SET
                story_count = story_count + 1,
                last_story_at = GREATEST(COALESCE(last_story_at, $2), $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(pool)
        .await?;
        Ok(location)
    }

    pub async fn set_popularity(id: LocationId, score: i64, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE locations SET popularity_score = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        Ok(())
    }
}
