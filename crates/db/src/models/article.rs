use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::entity::{self, EntityKind, Record};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Article {
    const KIND: EntityKind = EntityKind::Article;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub async fn create(pool: &SqlitePool, data: &CreateArticle) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Article>(
            r#"INSERT INTO articles (id, title, slug, excerpt, body, image_url, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.excerpt)
        .bind(&data.body)
        .bind(&data.image_url)
        .bind(data.published_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateArticle,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(
            r#"UPDATE articles
            SET title = COALESCE($2, title),
                excerpt = COALESCE($3, excerpt),
                body = COALESCE($4, body),
                image_url = COALESCE($5, image_url),
                published_at = COALESCE($6, published_at),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.excerpt)
        .bind(&data.body)
        .bind(&data.image_url)
        .bind(data.published_at)
        .fetch_optional(pool)
        .await
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

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        entity::delete::<Article>(pool, id).await
    }
}
