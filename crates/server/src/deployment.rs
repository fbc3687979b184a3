use std::sync::Arc;

use db::DBService;
use services::services::{
    config::ResolverConfig,
    content_cache::{CachedContentStore, ContentCache},
    content_store::{ContentStore, SqliteContentStore},
    override_resolver::OverrideResolver,
    relationship::RelationshipService,
};
use uuid::Uuid;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    relationships: RelationshipService,
    resolver: Arc<OverrideResolver>,
    cache: Option<ContentCache>,
}

impl Deployment {
    pub async fn new(database_url: &str, config: &ResolverConfig) -> Result<Self, sqlx::Error> {
        let db = DBService::new(database_url).await?;
        Ok(Self::from_db(db, config))
    }

    pub fn from_db(db: DBService, config: &ResolverConfig) -> Self {
        let cache = ContentCache::from_config(config);
        let sqlite = SqliteContentStore::new(db.pool.clone());
        let store: Arc<dyn ContentStore> = match &cache {
            Some(cache) => Arc::new(CachedContentStore::new(sqlite, cache.clone())),
            None => Arc::new(sqlite),
        };

        Self {
            relationships: RelationshipService::new(db.pool.clone(), cache.clone()),
            resolver: Arc::new(OverrideResolver::with_default_blocks(store, config)),
            db,
            cache,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn relationships(&self) -> &RelationshipService {
        &self.relationships
    }

    pub fn resolver(&self) -> &OverrideResolver {
        &self.resolver
    }

    /// Call after any content record is edited or deleted.
    pub fn invalidate_content(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    /// Call after a location's links were removed outside the relationship service.
    pub async fn invalidate_location(&self, location_id: Uuid) {
        if let Some(cache) = &self.cache {
            cache.invalidate_location(location_id).await;
        }
    }
}
