//! Short-lived cache of location-scoped content reads.
//!
//! Entries are keyed by `(location, content kind)`. Every link mutation for a
//! location must call [`ContentCache::invalidate`] or
//! [`ContentCache::invalidate_location`]; content edits call
//! [`ContentCache::invalidate_all`].

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use db::models::{article::Article, entity::EntityKind, product::Product, promotion::Promotion};
use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use super::{
    config::ResolverConfig,
    content_store::{ContentStore, ContentStoreError},
};

type Entries<T> = Cache<Uuid, Arc<Vec<T>>>;

#[derive(Clone)]
pub struct ContentCache {
    products: Entries<Product>,
    promotions: Entries<Promotion>,
    articles: Entries<Article>,
    /// Bumped on every invalidation so in-flight reads do not re-insert stale data.
    epoch: Arc<AtomicU64>,
}

impl ContentCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        fn entries<T: Send + Sync + 'static>(ttl: Duration, capacity: u64) -> Entries<T> {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build()
        }

        Self {
            products: entries(ttl, capacity),
            promotions: entries(ttl, capacity),
            articles: entries(ttl, capacity),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// `None` when caching is disabled.
    pub fn from_config(config: &ResolverConfig) -> Option<Self> {
        config
            .cache_ttl
            .map(|ttl| Self::new(ttl, config.cache_capacity))
    }

    pub async fn invalidate(&self, location_id: Uuid, kind: EntityKind) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        match kind {
            EntityKind::Product => self.products.invalidate(&location_id).await,
            EntityKind::Promotion => self.promotions.invalidate(&location_id).await,
            EntityKind::Article => self.articles.invalidate(&location_id).await,
            EntityKind::Location => {}
        }
        debug!(location_id = %location_id, kind = %kind, "Invalidated cached content");
    }

    pub async fn invalidate_location(&self, location_id: Uuid) {
        for kind in [EntityKind::Product, EntityKind::Promotion, EntityKind::Article] {
            self.invalidate(location_id, kind).await;
        }
    }

    pub fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.products.invalidate_all();
        self.promotions.invalidate_all();
        self.articles.invalidate_all();
        debug!("Invalidated all cached content");
    }

    async fn read_through<T, F>(
        &self,
        entries: &Entries<T>,
        location_id: Uuid,
        fetch: F,
    ) -> Result<Vec<T>, ContentStoreError>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = Result<Vec<T>, ContentStoreError>>,
    {
        if let Some(hit) = entries.get(&location_id).await {
            return Ok(hit.as_ref().clone());
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let records = fetch.await?;

        if self.epoch.load(Ordering::SeqCst) == epoch {
            entries.insert(location_id, Arc::new(records.clone())).await;
            // An invalidation may have landed between the check and the insert.
            if self.epoch.load(Ordering::SeqCst) != epoch {
                entries.invalidate(&location_id).await;
            }
        }

        Ok(records)
    }
}

/// Wraps a store and caches its per-location reads. Batch reads by id pass through.
pub struct CachedContentStore<S> {
    inner: S,
    cache: ContentCache,
}

impl<S: ContentStore> CachedContentStore<S> {
    pub fn new(inner: S, cache: ContentCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }
}

#[async_trait]
impl<S: ContentStore> ContentStore for CachedContentStore<S> {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ContentStoreError> {
        self.inner.products_by_ids(ids).await
    }

    async fn promotions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Promotion>, ContentStoreError> {
        self.inner.promotions_by_ids(ids).await
    }

    async fn articles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>, ContentStoreError> {
        self.inner.articles_by_ids(ids).await
    }

    async fn products_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Product>, ContentStoreError> {
        self.cache
            .read_through(
                &self.cache.products,
                location_id,
                self.inner.products_for_location(location_id),
            )
            .await
    }

    async fn promotions_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Promotion>, ContentStoreError> {
        self.cache
            .read_through(
                &self.cache.promotions,
                location_id,
                self.inner.promotions_for_location(location_id),
            )
            .await
    }

    async fn articles_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Article>, ContentStoreError> {
        self.cache
            .read_through(
                &self.cache.articles,
                location_id,
                self.inner.articles_for_location(location_id),
            )
            .await
    }
}
