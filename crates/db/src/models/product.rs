use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::entity::{self, EntityKind, Record};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

impl Product {
    pub async fn create(pool: &SqlitePool, data: &CreateProduct) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"INSERT INTO products (id, name, description, image_url, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(data.price)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                price = COALESCE($5, price),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(data.price)
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

    /// Deletes the product and every link referencing it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        entity::delete::<Product>(pool, id).await
    }
}
