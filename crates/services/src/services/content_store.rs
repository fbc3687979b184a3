//! Read-side seam between the resolver and content storage.

use async_trait::async_trait;
use db::models::{
    article::Article,
    link::{Link, Relation},
    product::Product,
    promotion::Promotion,
};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

/// Batch and location-scoped reads of content records.
///
/// `*_by_ids` skip unknown ids and may return records in any order.
/// `*_for_location` return the records linked to the location in link order,
/// without dangling links.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ContentStoreError>;

    async fn promotions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Promotion>, ContentStoreError>;

    async fn articles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>, ContentStoreError>;

    async fn products_for_location(&self, location_id: Uuid)
    -> Result<Vec<Product>, ContentStoreError>;

    async fn promotions_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Promotion>, ContentStoreError>;

    async fn articles_for_location(&self, location_id: Uuid)
    -> Result<Vec<Article>, ContentStoreError>;
}

#[derive(Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ContentStoreError> {
        Ok(Product::find_by_ids(&self.pool, ids).await?)
    }

    async fn promotions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Promotion>, ContentStoreError> {
        Ok(Promotion::find_by_ids(&self.pool, ids).await?)
    }

    async fn articles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>, ContentStoreError> {
        Ok(Article::find_by_ids(&self.pool, ids).await?)
    }

    async fn products_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Product>, ContentStoreError> {
        Ok(Link::right_records(&self.pool, Relation::LocationProduct, location_id).await?)
    }

    async fn promotions_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Promotion>, ContentStoreError> {
        Ok(Link::right_records(&self.pool, Relation::LocationPromotion, location_id).await?)
    }

    async fn articles_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Article>, ContentStoreError> {
        Ok(Link::right_records(&self.pool, Relation::LocationArticle, location_id).await?)
    }
}
