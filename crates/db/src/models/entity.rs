//! Entity kinds and the generic row helpers shared by every content table.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Every table that can sit on either side of a link.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Location,
    Product,
    Promotion,
    Article,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Location => "locations",
            Self::Product => "products",
            Self::Promotion => "promotions",
            Self::Article => "articles",
        }
    }

    /// Column name used for this entity inside junction tables.
    pub fn id_column(self) -> &'static str {
        match self {
            Self::Location => "location_id",
            Self::Product => "product_id",
            Self::Promotion => "promotion_id",
            Self::Article => "article_id",
        }
    }
}

/// A row type stored in one of the entity tables.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
}

pub async fn find_by_id<R: Record>(pool: &SqlitePool, id: Uuid) -> Result<Option<R>, sqlx::Error> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", R::KIND.table());
    sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(pool).await
}

/// Batch lookup. Unknown ids are skipped; result order is storage order.
pub async fn find_by_ids<R: Record>(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<R>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {} WHERE id IN (", R::KIND.table()));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    builder.build_query_as::<R>().fetch_all(pool).await
}

pub async fn find_all<R: Record>(pool: &SqlitePool) -> Result<Vec<R>, sqlx::Error> {
    let sql = format!("SELECT * FROM {} ORDER BY created_at ASC", R::KIND.table());
    sqlx::query_as::<_, R>(&sql).fetch_all(pool).await
}

/// Delete the row and every link that references it, atomically.
pub async fn delete<R: Record>(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    super::link::Link::delete_all_for_entity(&mut *tx, R::KIND, id).await?;

    let sql = format!("DELETE FROM {} WHERE id = $1", R::KIND.table());
    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}
