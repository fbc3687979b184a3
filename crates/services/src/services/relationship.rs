//! Relationship store: links between locations and content, and between
//! content types. Every mutation of a location-owned relation invalidates the
//! cached content for that location.

use db::models::{
    article::Article,
    entity::EntityKind,
    link::{Link, OverrideGroup, Relation},
    location::Location,
    product::Product,
    promotion::Promotion,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::content_cache::ContentCache;

#[derive(Debug, Error)]
pub enum RelationshipError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct RelationshipService {
    pool: SqlitePool,
    cache: Option<ContentCache>,
}

impl RelationshipService {
    pub fn new(pool: SqlitePool, cache: Option<ContentCache>) -> Self {
        Self { pool, cache }
    }

    pub async fn link(
        &self,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<Uuid, RelationshipError> {
        let link_id = Link::link(&self.pool, relation, left_id, right_id).await?;
        self.invalidate(relation, left_id).await;

        debug!(
            relation = %relation,
            left_id = %left_id,
            right_id = %right_id,
            link_id = %link_id,
            "Linked"
        );
        Ok(link_id)
    }

    /// Returns whether a link was removed; an absent pair is not an error.
    pub async fn unlink(
        &self,
        relation: Relation,
        left_id: Uuid,
        right_id: Uuid,
    ) -> Result<bool, RelationshipError> {
        let removed = Link::unlink(&self.pool, relation, left_id, right_id).await?;
        self.invalidate(relation, left_id).await;

        debug!(
            relation = %relation,
            left_id = %left_id,
            right_id = %right_id,
            removed = removed,
            "Unlinked"
        );
        Ok(removed > 0)
    }

    /// Replaces the links of every owner named in `groups`. Callers pass the
    /// complete desired state; owners not mentioned are untouched.
    pub async fn sync_overrides(
        &self,
        relation: Relation,
        groups: &[OverrideGroup],
    ) -> Result<u64, RelationshipError> {
        let inserted = Link::sync_overrides(&self.pool, relation, groups).await?;

        let mut owners: Vec<Uuid> = groups
            .iter()
            .flat_map(|group| group.owner_ids.iter().copied())
            .collect();
        owners.sort_unstable();
        owners.dedup();
        for owner in &owners {
            self.invalidate(relation, *owner).await;
        }

        info!(
            relation = %relation,
            owners = owners.len(),
            inserted = inserted,
            "Synced overrides"
        );
        Ok(inserted)
    }

    /// Administrative cleanup by link id. Returns whether a link was removed.
    pub async fn remove_link_by_id(
        &self,
        relation: Relation,
        link_id: Uuid,
    ) -> Result<bool, RelationshipError> {
        let Some(link) = Link::find_by_id(&self.pool, relation, link_id).await? else {
            return Ok(false);
        };

        let removed = Link::remove_by_id(&self.pool, relation, link_id).await?;
        self.invalidate(relation, link.left_id).await;
        Ok(removed > 0)
    }

    pub async fn links_for_left(
        &self,
        relation: Relation,
        left_id: Uuid,
    ) -> Result<Vec<Link>, RelationshipError> {
        Ok(Link::find_by_left(&self.pool, relation, left_id).await?)
    }

    pub async fn links_for_right(
        &self,
        relation: Relation,
        right_id: Uuid,
    ) -> Result<Vec<Link>, RelationshipError> {
        Ok(Link::find_by_right(&self.pool, relation, right_id).await?)
    }

    pub async fn products_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Product>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::LocationProduct, location_id).await?)
    }

    pub async fn promotions_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Promotion>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::LocationPromotion, location_id).await?)
    }

    pub async fn articles_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Article>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::LocationArticle, location_id).await?)
    }

    pub async fn locations_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<Location>, RelationshipError> {
        Ok(Link::left_records(&self.pool, Relation::LocationProduct, product_id).await?)
    }

    pub async fn locations_for_promotion(
        &self,
        promotion_id: Uuid,
    ) -> Result<Vec<Location>, RelationshipError> {
        Ok(Link::left_records(&self.pool, Relation::LocationPromotion, promotion_id).await?)
    }

    pub async fn locations_for_article(
        &self,
        article_id: Uuid,
    ) -> Result<Vec<Location>, RelationshipError> {
        Ok(Link::left_records(&self.pool, Relation::LocationArticle, article_id).await?)
    }

    pub async fn products_for_article(
        &self,
        article_id: Uuid,
    ) -> Result<Vec<Product>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::ArticleProduct, article_id).await?)
    }

    pub async fn promotions_for_article(
        &self,
        article_id: Uuid,
    ) -> Result<Vec<Promotion>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::ArticlePromotion, article_id).await?)
    }

    pub async fn promotions_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<Promotion>, RelationshipError> {
        Ok(Link::right_records(&self.pool, Relation::ProductPromotion, product_id).await?)
    }

    async fn invalidate(&self, relation: Relation, left_id: Uuid) {
        if relation.left() != EntityKind::Location {
            return;
        }
        if let Some(cache) = &self.cache {
            cache.invalidate(left_id, relation.right()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use db::{
        DBService,
        models::{
            location::{CreateLocation, LocationSlug, PostalAddress},
            page::{ComponentNode, PageDocument},
            product::CreateProduct,
        },
    };
    use serde_json::json;

    use super::*;
    use crate::services::{
        config::ResolverConfig,
        content_cache::CachedContentStore,
        content_store::{ContentStore, SqliteContentStore},
        override_resolver::OverrideResolver,
    };

    struct Fixture {
        db: DBService,
        cache: ContentCache,
        relationships: RelationshipService,
        resolver: OverrideResolver,
    }

    async fn fixture() -> Fixture {
        let db = DBService::new_in_memory().await.unwrap();
        let cache = ContentCache::new(Duration::from_secs(300), 1_000);
        let store = CachedContentStore::new(SqliteContentStore::new(db.pool.clone()), cache.clone());
        let resolver = OverrideResolver::with_default_blocks(
            Arc::new(store) as Arc<dyn ContentStore>,
            &ResolverConfig::default(),
        );
        let relationships = RelationshipService::new(db.pool.clone(), Some(cache.clone()));
        Fixture {
            db,
            cache,
            relationships,
            resolver,
        }
    }

    async fn location(pool: &SqlitePool, slug: &str) -> Location {
        Location::create(
            pool,
            &CreateLocation {
                name: slug.to_string(),
                address: PostalAddress {
                    street: "1 Main St".to_string(),
                    city: "Austin".to_string(),
                    region: "TX".to_string(),
                    postal_code: "78701".to_string(),
                    country: None,
                },
                slug: LocationSlug::new("texas", "austin", slug),
            },
        )
        .await
        .unwrap()
    }

    async fn product(pool: &SqlitePool, name: &str) -> Product {
        Product::create(
            pool,
            &CreateProduct {
                name: name.to_string(),
                price: Some(3.25),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    fn products_page() -> PageDocument {
        let props = json!({
            "heading": "Menu",
            "contentSource": { "source": "dynamic", "dynamicMode": "perLocation" },
            "products": []
        });
        PageDocument {
            content: vec![ComponentNode::new(
                "ProductsSection",
                props.as_object().unwrap().clone(),
            )],
            ..Default::default()
        }
    }

    fn titles(doc: &PageDocument) -> Vec<String> {
        doc.content[0].props["products"]
            .as_array()
            .map(|cards| {
                cards
                    .iter()
                    .map(|card| card["title"].as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_resolves_linked_products_end_to_end() {
        let f = fixture().await;
        let loc = location(&f.db.pool, "downtown").await;
        let seven = product(&f.db.pool, "Prod 7").await;
        let three = product(&f.db.pool, "Prod 3").await;

        f.relationships
            .link(Relation::LocationProduct, loc.id, seven.id)
            .await
            .unwrap();
        f.relationships
            .link(Relation::LocationProduct, loc.id, three.id)
            .await
            .unwrap();

        let resolved = f.resolver.resolve(&products_page(), loc.id).await;
        assert_eq!(titles(&resolved), vec!["Prod 7", "Prod 3"]);
        assert_eq!(resolved.content[0].props["products"][0]["price"], "$3.25");
        assert_eq!(resolved.content[0].props["heading"], "Menu");
    }

    #[tokio::test]
    async fn test_mutations_invalidate_cached_content() {
        let f = fixture().await;
        let loc = location(&f.db.pool, "downtown").await;
        let latte = product(&f.db.pool, "Latte").await;
        let mocha = product(&f.db.pool, "Mocha").await;

        f.relationships
            .link(Relation::LocationProduct, loc.id, latte.id)
            .await
            .unwrap();
        assert_eq!(titles(&f.resolver.resolve(&products_page(), loc.id).await), vec!["Latte"]);

        f.relationships
            .sync_overrides(
                Relation::LocationProduct,
                &[OverrideGroup {
                    owner_ids: vec![loc.id],
                    item_ids: vec![mocha.id],
                }],
            )
            .await
            .unwrap();
        assert_eq!(titles(&f.resolver.resolve(&products_page(), loc.id).await), vec!["Mocha"]);

        assert!(f
            .relationships
            .unlink(Relation::LocationProduct, loc.id, mocha.id)
            .await
            .unwrap());
        let page = products_page();
        assert_eq!(f.resolver.resolve(&page, loc.id).await, page);
    }

    #[tokio::test]
    async fn test_remove_link_by_id_invalidates_owner() {
        let f = fixture().await;
        let loc = location(&f.db.pool, "downtown").await;
        let latte = product(&f.db.pool, "Latte").await;

        let link_id = f
            .relationships
            .link(Relation::LocationProduct, loc.id, latte.id)
            .await
            .unwrap();
        assert_eq!(titles(&f.resolver.resolve(&products_page(), loc.id).await), vec!["Latte"]);

        assert!(f
            .relationships
            .remove_link_by_id(Relation::LocationProduct, link_id)
            .await
            .unwrap());
        assert!(!f
            .relationships
            .remove_link_by_id(Relation::LocationProduct, link_id)
            .await
            .unwrap());
        assert!(titles(&f.resolver.resolve(&products_page(), loc.id).await).is_empty());
    }

    #[tokio::test]
    async fn test_content_edit_needs_global_invalidation() {
        let f = fixture().await;
        let loc = location(&f.db.pool, "downtown").await;
        let latte = product(&f.db.pool, "Latte").await;
        f.relationships
            .link(Relation::LocationProduct, loc.id, latte.id)
            .await
            .unwrap();
        f.resolver.resolve(&products_page(), loc.id).await;

        Product::delete(&f.db.pool, latte.id).await.unwrap();
        f.cache.invalidate_all();

        let page = products_page();
        assert_eq!(f.resolver.resolve(&page, loc.id).await, page);
    }

    #[tokio::test]
    async fn test_bidirectional_lookup() {
        let f = fixture().await;
        let north = location(&f.db.pool, "north").await;
        let south = location(&f.db.pool, "south").await;
        let latte = product(&f.db.pool, "Latte").await;

        for loc in [&north, &south] {
            f.relationships
                .link(Relation::LocationProduct, loc.id, latte.id)
                .await
                .unwrap();
        }

        let locations = f.relationships.locations_for_product(latte.id).await.unwrap();
        let slugs: Vec<&str> = locations.iter().map(|l| l.slug.location.as_str()).collect();
        assert_eq!(slugs, vec!["north", "south"]);

        Location::delete(&f.db.pool, north.id).await.unwrap();
        let locations = f.relationships.locations_for_product(latte.id).await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(f.relationships.links_for_right(Relation::LocationProduct, latte.id).await.unwrap().len(), 1);
    }
}
