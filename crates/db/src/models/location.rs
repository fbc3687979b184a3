use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::entity::{self, EntityKind, Record};

static SLUG_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid slug segment: {0:?}")]
    InvalidSlug(String),
    #[error("slug already in use: {0}")]
    SlugTaken(String),
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: Option<String>,
}

/// Three-segment URL path of a location page, e.g. `texas/austin/south-lamar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize, TS)]
pub struct LocationSlug {
    #[sqlx(rename = "slug_region")]
    pub region: String,
    #[sqlx(rename = "slug_city")]
    pub city: String,
    #[sqlx(rename = "slug_location")]
    pub location: String,
}

impl LocationSlug {
    pub fn new(
        region: impl Into<String>,
        city: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            city: city.into(),
            location: location.into(),
        }
    }

    /// Every segment must be lowercase, hyphen-separated, without leading or trailing hyphens.
    pub fn validate(&self) -> Result<(), LocationError> {
        for segment in [&self.region, &self.city, &self.location] {
            if !SLUG_SEGMENT.is_match(segment) {
                return Err(LocationError::InvalidSlug(segment.clone()));
            }
        }
        Ok(())
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.region, self.city, self.location)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    pub address: PostalAddress,
    #[sqlx(flatten)]
    pub slug: LocationSlug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLocation {
    pub name: String,
    pub address: PostalAddress,
    pub slug: LocationSlug,
}

impl Location {
    pub async fn create(pool: &SqlitePool, data: &CreateLocation) -> Result<Self, LocationError> {
        data.slug.validate()?;

        let id = Uuid::new_v4();
        let result = sqlx::query_as::<_, Location>(
            r#"INSERT INTO locations (
                id, name, street, city, region, postal_code, country,
                slug_region, slug_city, slug_location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.address.street)
        .bind(&data.address.city)
        .bind(&data.address.region)
        .bind(&data.address.postal_code)
        .bind(&data.address.country)
        .bind(&data.slug.region)
        .bind(&data.slug.city)
        .bind(&data.slug.location)
        .fetch_one(pool)
        .await;

        match result {
            Ok(location) => Ok(location),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(LocationError::SlugTaken(data.slug.path()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        entity::find_by_id(pool, id).await
    }

    pub async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        entity::find_by_ids(pool, ids).await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        entity::find_all(pool).await
    }

    pub async fn find_by_slug(
        pool: &SqlitePool,
        slug: &LocationSlug,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Location>(
            r#"SELECT * FROM locations
            WHERE slug_region = $1 AND slug_city = $2 AND slug_location = $3"#,
        )
        .bind(&slug.region)
        .bind(&slug.city)
        .bind(&slug.location)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the location and its links. Pages are left alone.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        entity::delete::<Location>(pool, id).await
    }
}
