//! Many-to-many junction tables between locations and content items.
//!
//! Each [`Relation`] owns one table holding `(left, right)` pairs. A pair is
//! stored at most once per relation; creation is idempotent and deletion of
//! an absent pair is a no-op.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use super::entity::{self, EntityKind, Record};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Relation {
    LocationProduct,
    LocationPromotion,
    LocationArticle,
    ArticleProduct,
    ArticlePromotion,
    ProductPromotion,
}

impl Relation {
    pub fn table(self) -> &'static str {
        match self {
            Self::LocationProduct => "location_products",
            Self::LocationPromotion => "location_promotions",
            Self::LocationArticle => "location_articles",
            Self::ArticleProduct => "article_products",
            Self::ArticlePromotion => "article_promotions",
            Self::ProductPromotion => "product_promotions",
        }
    }

    pub fn left(self) -> EntityKind {
        match self {
            Self::LocationProduct | Self::LocationPromotion | Self::LocationArticle => {
                EntityKind::Location
            }
            Self::ArticleProduct | Self::ArticlePromotion => EntityKind::Article,
            Self::ProductPromotion => EntityKind::Product,
        }
    }

    pub fn right(self) -> EntityKind {
        match self {
            Self::LocationProduct | Self::ArticleProduct => EntityKind::Product,
            Self::LocationPromotion | Self::ArticlePromotion | Self::ProductPromotion => {
                EntityKind::Promotion
            }
            Self::LocationArticle => EntityKind::Article,
        }
    }

    /// The location-owned relation whose right side is `kind`, if any.
    pub fn for_location(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Product => Some(Self::LocationProduct),
            EntityKind::Promotion => Some(Self::LocationPromotion),
            EntityKind::Article => Some(Self::LocationArticle),
            EntityKind::Location => None,
        }
    }

    fn select_columns(self) -> String {
        format!(
            "id, {} AS left_id, {} AS right_id, created_at",
            self.left().id_column(),
            self.right().id_column()
        )
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Link {
    pub id: Uuid,
    pub left_id: Uuid,
    pub right_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Desired state for a set of owners: every owner is linked to exactly `item_ids`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct OverrideGroup {
    #[serde(alias = "locationIds", alias = "ownerIds")]
    pub owner_ids: Vec<Uuid>,
    #[serde(alias = "itemIds")]
    pub item_ids: Vec<Uuid>,
}

impl Link {
    pub async fn find_by_id(
        pool: &SqlitePool,
        relation: Relation,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            relation.select_columns(),
            relation.table()
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_pair(
        pool: &SqlitePool,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 AND {} = $2",
            relation.select_columns(),
            relation.table(),
            relation.left().id_column(),
            relation.right().id_column()
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(left_id)
            .bind(right_id)
            .fetch_optional(pool)
            .await
    }

    /// All links owned by `left_id`, in insertion order.
    pub async fn find_by_left(
        pool: &SqlitePool,
        relation: Relation,
        left_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY rowid ASC",
            relation.select_columns(),
            relation.table(),
            relation.left().id_column()
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(left_id)
            .fetch_all(pool)
            .await
    }

    /// All links pointing at `right_id`, in insertion order.
    pub async fn find_by_right(
        pool: &SqlitePool,
        relation: Relation,
        right_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY rowid ASC",
            relation.select_columns(),
            relation.table(),
            relation.right().id_column()
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(right_id)
            .fetch_all(pool)
            .await
    }

    /// Returns the id of the existing link for the pair, creating it if needed.
    pub async fn link(
        pool: &SqlitePool,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<Uuid, sqlx::Error> {
        if let Some(existing) = Self::find_by_pair(pool, relation, left_id, right_id).await? {
            return Ok(existing.id);
        }

        {
            let mut conn = pool.acquire().await?;
            Self::insert(&mut conn, relation, left_id, right_id).await?;
        }

        // A concurrent caller may have won the insert; the stored row is authoritative.
        Self::find_by_pair(pool, relation, left_id, right_id)
            .await?
            .map(|link| link.id)
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Deletes the link for the pair. Returns the number of rows removed (0 or 1).
    pub async fn unlink(
        pool: &SqlitePool,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            relation.table(),
            relation.left().id_column(),
            relation.right().id_column()
        );
        let result = sqlx::query(&sql)
            .bind(left_id)
            .bind(right_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_by_id(
        pool: &SqlitePool,
        relation: Relation,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = $1", relation.table());
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Replaces every owner's links with the groups' cross products.
    ///
    /// All owners mentioned in any group are wiped first, then each
    /// `(owner, item)` pair is inserted once. Runs in a single transaction so
    /// readers never observe the intermediate empty state. Returns the number
    /// of links inserted.
    pub async fn sync_overrides(
        pool: &SqlitePool,
        relation: Relation,
        groups: &[OverrideGroup],
    ) -> Result<u64, sqlx::Error> {
        let owners: BTreeSet<Uuid> = groups
            .iter()
            .flat_map(|group| group.owner_ids.iter().copied())
            .collect();

        let mut tx = pool.begin().await?;

        let delete_sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            relation.table(),
            relation.left().id_column()
        );
        for owner in &owners {
            sqlx::query(&delete_sql).bind(*owner).execute(&mut *tx).await?;
        }

        let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
        let mut inserted = 0;
        for group in groups {
            for owner in &group.owner_ids {
                for item in &group.item_ids {
                    if seen.insert((*owner, *item)) {
                        Self::insert(&mut tx, relation, *owner, *item).await?;
                        inserted += 1;
                    }
                }
            }
        }

        tx.commit().await?;

        debug!(
            relation = %relation,
            owners = owners.len(),
            inserted = inserted,
            "Synced link overrides"
        );
        Ok(inserted)
    }

    /// Removes every link in every relation that references the entity.
    pub async fn delete_all_for_entity(
        conn: &mut SqliteConnection,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let mut removed = 0;
        for relation in Relation::iter() {
            let columns = [
                (relation.left() == kind).then(|| relation.left().id_column()),
                (relation.right() == kind).then(|| relation.right().id_column()),
            ];
            for column in columns.into_iter().flatten() {
                let sql = format!("DELETE FROM {} WHERE {} = $1", relation.table(), column);
                removed += sqlx::query(&sql)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected();
            }
        }
        Ok(removed)
    }

    /// Records linked to `left_id`, in link insertion order. Links whose
    /// target row no longer exists are dropped.
    pub async fn right_records<R: Record>(
        pool: &SqlitePool,
        relation: Relation,
        left_id: Uuid,
    ) -> Result<Vec<R>, sqlx::Error> {
        check_kind::<R>(relation, relation.right())?;
        let links = Self::find_by_left(pool, relation, left_id).await?;
        let ids: Vec<Uuid> = links.iter().map(|link| link.right_id).collect();
        resolve_in_order(pool, relation, &ids).await
    }

    /// Records linking to `right_id`, in link insertion order. Dangling links are dropped.
    pub async fn left_records<R: Record>(
        pool: &SqlitePool,
        relation: Relation,
        right_id: Uuid,
    ) -> Result<Vec<R>, sqlx::Error> {
        check_kind::<R>(relation, relation.left())?;
        let links = Self::find_by_right(pool, relation, right_id).await?;
        let ids: Vec<Uuid> = links.iter().map(|link| link.left_id).collect();
        resolve_in_order(pool, relation, &ids).await
    }

    async fn insert(
        conn: &mut SqliteConnection,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let left = relation.left().id_column();
        let right = relation.right().id_column();
        let sql = format!(
            "INSERT INTO {table} (id, {left}, {right}) VALUES ($1, $2, $3)
             ON CONFLICT({left}, {right}) DO NOTHING",
            table = relation.table(),
        );
        sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(left_id)
            .bind(right_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

fn check_kind<R: Record>(relation: Relation, expected: EntityKind) -> Result<(), sqlx::Error> {
    if R::KIND == expected {
        Ok(())
    } else {
        Err(sqlx::Error::Protocol(format!(
            "relation {relation} holds {expected} records, not {}",
            R::KIND
        )))
    }
}

async fn resolve_in_order<R: Record>(
    pool: &SqlitePool,
    relation: Relation,
    ids: &[Uuid],
) -> Result<Vec<R>, sqlx::Error> {
    let mut by_id: HashMap<Uuid, R> = entity::find_by_ids::<R>(pool, ids)
        .await?
        .into_iter()
        .map(|record| (record.id(), record))
        .collect();

    let records: Vec<R> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    if records.len() < ids.len() {
        debug!(
            relation = %relation,
            dangling = ids.len() - records.len(),
            "Dropped links to missing records"
        );
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            location::Location,
            product::{CreateProduct, Product},
        },
    };

    async fn product(pool: &SqlitePool, name: &str) -> Product {
        Product::create(
            pool,
            &CreateProduct {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    async fn linked_ids(pool: &SqlitePool, relation: Relation, left_id: Uuid) -> Vec<Uuid> {
        Link::find_by_left(pool, relation, left_id)
            .await
            .unwrap()
            .into_iter()
            .map(|link| link.right_id)
            .collect()
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let db = DBService::new_in_memory().await.unwrap();
        let (location, item) = (Uuid::new_v4(), Uuid::new_v4());

        let first = Link::link(&db.pool, Relation::LocationProduct, location, item).await.unwrap();
        let second = Link::link(&db.pool, Relation::LocationProduct, location, item).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            Link::find_by_left(&db.pool, Relation::LocationProduct, location)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_relations_are_independent() {
        let db = DBService::new_in_memory().await.unwrap();
        let (location, item) = (Uuid::new_v4(), Uuid::new_v4());

        Link::link(&db.pool, Relation::LocationProduct, location, item).await.unwrap();

        assert!(linked_ids(&db.pool, Relation::LocationPromotion, location).await.is_empty());
        assert_eq!(linked_ids(&db.pool, Relation::LocationProduct, location).await, vec![item]);
    }

    #[tokio::test]
    async fn test_unlink_absent_pair_is_noop() {
        let db = DBService::new_in_memory().await.unwrap();
        let (location, item) = (Uuid::new_v4(), Uuid::new_v4());

        let removed = Link::unlink(&db.pool, Relation::LocationProduct, location, item).await.unwrap();
        assert_eq!(removed, 0);
        assert!(Link::find_by_pair(&db.pool, Relation::LocationProduct, location, item)
            .await
            .unwrap()
            .is_none());

        Link::link(&db.pool, Relation::LocationProduct, location, item).await.unwrap();
        let removed = Link::unlink(&db.pool, Relation::LocationProduct, location, item).await.unwrap();
        assert_eq!(removed, 1);
        assert!(linked_ids(&db.pool, Relation::LocationProduct, location).await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_replaces_instead_of_merging() {
        let db = DBService::new_in_memory().await.unwrap();
        let location = Uuid::new_v4();
        let (p1, p2, p3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        Link::link(&db.pool, Relation::LocationProduct, location, p1).await.unwrap();
        Link::link(&db.pool, Relation::LocationProduct, location, p2).await.unwrap();

        let inserted = Link::sync_overrides(
            &db.pool,
            Relation::LocationProduct,
            &[OverrideGroup {
                owner_ids: vec![location],
                item_ids: vec![p3],
            }],
        )
        .await
        .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(linked_ids(&db.pool, Relation::LocationProduct, location).await, vec![p3]);
    }

    #[tokio::test]
    async fn test_sync_dedupes_pairs_across_groups() {
        let db = DBService::new_in_memory().await.unwrap();
        let (north, south, untouched) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        Link::link(&db.pool, Relation::LocationProduct, untouched, a).await.unwrap();

        let inserted = Link::sync_overrides(
            &db.pool,
            Relation::LocationProduct,
            &[
                OverrideGroup {
                    owner_ids: vec![north, south],
                    item_ids: vec![a, b],
                },
                OverrideGroup {
                    owner_ids: vec![north],
                    item_ids: vec![b, a],
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(inserted, 4);
        assert_eq!(linked_ids(&db.pool, Relation::LocationProduct, north).await, vec![a, b]);
        assert_eq!(linked_ids(&db.pool, Relation::LocationProduct, south).await, vec![a, b]);
        assert_eq!(linked_ids(&db.pool, Relation::LocationProduct, untouched).await, vec![a]);
    }

    #[tokio::test]
    async fn test_sync_with_empty_items_clears_owner() {
        let db = DBService::new_in_memory().await.unwrap();
        let location = Uuid::new_v4();
        Link::link(&db.pool, Relation::LocationPromotion, location, Uuid::new_v4())
            .await
            .unwrap();

        Link::sync_overrides(
            &db.pool,
            Relation::LocationPromotion,
            &[OverrideGroup {
                owner_ids: vec![location],
                item_ids: vec![],
            }],
        )
        .await
        .unwrap();

        assert!(linked_ids(&db.pool, Relation::LocationPromotion, location).await.is_empty());
    }

    #[tokio::test]
    async fn test_right_records_keep_order_and_drop_dangling() {
        let db = DBService::new_in_memory().await.unwrap();
        let location = Uuid::new_v4();
        let seven = product(&db.pool, "Prod 7").await;
        let three = product(&db.pool, "Prod 3").await;
        let gone = product(&db.pool, "Gone").await;

        for item in [&seven, &gone, &three] {
            Link::link(&db.pool, Relation::LocationProduct, location, item.id).await.unwrap();
        }
        // Bypass the cascading delete to leave a dangling link behind.
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(gone.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let products: Vec<Product> =
            Link::right_records(&db.pool, Relation::LocationProduct, location).await.unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Prod 7", "Prod 3"]);
    }

    #[tokio::test]
    async fn test_left_records_and_kind_check() {
        let db = DBService::new_in_memory().await.unwrap();
        let item = product(&db.pool, "Espresso").await;

        let locations: Vec<Location> =
            Link::left_records(&db.pool, Relation::LocationProduct, item.id).await.unwrap();
        assert!(locations.is_empty());

        let wrong: Result<Vec<Product>, _> =
            Link::left_records(&db.pool, Relation::LocationProduct, item.id).await;
        assert!(wrong.is_err());
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let db = DBService::new_in_memory().await.unwrap();
        let (article, promotion) = (Uuid::new_v4(), Uuid::new_v4());
        let link_id = Link::link(&db.pool, Relation::ArticlePromotion, article, promotion)
            .await
            .unwrap();

        let link = Link::find_by_id(&db.pool, Relation::ArticlePromotion, link_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((link.left_id, link.right_id), (article, promotion));

        assert_eq!(Link::remove_by_id(&db.pool, Relation::ArticlePromotion, link_id).await.unwrap(), 1);
        assert_eq!(Link::remove_by_id(&db.pool, Relation::ArticlePromotion, link_id).await.unwrap(), 0);
    }

    #[test]
    fn test_override_group_accepts_location_aliases() {
        let location = Uuid::new_v4();
        let item = Uuid::new_v4();
        let group: OverrideGroup = serde_json::from_value(serde_json::json!({
            "locationIds": [location],
            "itemIds": [item],
        }))
        .unwrap();
        assert_eq!(group.owner_ids, vec![location]);
        assert_eq!(group.item_ids, vec![item]);
    }
}
