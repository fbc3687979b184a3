//! Per-block-type resolvers for dynamically bound content.
//!
//! A resolver returns only the content-bearing fields it wants to overwrite;
//! the override resolver merges them over the authored props.

use std::collections::HashMap;

use async_trait::async_trait;
use db::models::{article::Article, page::Props, product::Product, promotion::Promotion};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::{
    content_source::{ContentSource, parse_ids},
    content_store::{ContentStore, ContentStoreError},
};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("content store error: {0}")]
    Store(#[from] ContentStoreError),
    #[error("failed to encode resolved props: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a block resolver gets to work with besides the node props.
pub struct ResolveContext<'a> {
    pub location_id: Uuid,
    pub store: &'a dyn ContentStore,
}

#[async_trait]
pub trait BlockResolver: Send + Sync {
    /// Returns the fields to overwrite, or `None` to keep the node as authored.
    async fn resolve(
        &self,
        props: &Props,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<Props>, ResolveError>;
}

/// Reorders `records` to follow `ids`. Ids without a record are dropped,
/// repeated ids resolve once, and records not named in `ids` go last.
pub fn order_by_ids<T>(ids: &[Uuid], records: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let index: HashMap<Uuid, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (id_of(record), i))
        .collect();
    let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();

    let mut ordered = Vec::with_capacity(slots.len());
    for id in ids {
        if let Some(record) = index.get(id).and_then(|&i| slots[i].take()) {
            ordered.push(record);
        }
    }
    ordered.extend(slots.into_iter().flatten());
    ordered
}

fn single_field(key: &str, value: impl Serialize) -> Result<Props, ResolveError> {
    let value = serde_json::to_value(value)?;
    let mut props = Props::new();
    props.insert(key.to_string(), value);
    Ok(props)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// List of products under `products` (product grids and carousels).
pub struct ProductsBlock {
    currency_prefix: String,
}

impl ProductsBlock {
    pub const FIELD: &'static str = "products";

    pub fn new(currency_prefix: impl Into<String>) -> Self {
        Self {
            currency_prefix: currency_prefix.into(),
        }
    }

    pub fn card(&self, product: &Product) -> ProductCard {
        ProductCard {
            id: product.id.to_string(),
            title: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: product
                .price
                .map(|price| format!("{}{:.2}", self.currency_prefix, price)),
        }
    }
}

#[async_trait]
impl BlockResolver for ProductsBlock {
    async fn resolve(
        &self,
        props: &Props,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<Props>, ResolveError> {
        let products = match ContentSource::from_props(props) {
            ContentSource::Static => return Ok(None),
            ContentSource::Synced { selected_ids } => {
                let ids = parse_ids(&selected_ids);
                if ids.is_empty() {
                    return Ok(None);
                }
                let fetched = ctx.store.products_by_ids(&ids).await?;
                order_by_ids(&ids, fetched, |product| product.id)
            }
            ContentSource::PerLocation => ctx.store.products_for_location(ctx.location_id).await?,
        };

        if products.is_empty() {
            return Ok(None);
        }

        let cards: Vec<ProductCard> = products.iter().map(|product| self.card(product)).collect();
        single_field(Self::FIELD, cards).map(Some)
    }
}

/// Single promotion slot. Only `title`, `description` and `imageUrl` are
/// overwritten, and only with values the promotion actually has.
#[derive(Debug, Default)]
pub struct PromotionBlock;

impl PromotionBlock {
    pub fn fields(promotion: &Promotion) -> Props {
        let mut props = Props::new();
        props.insert("title".to_string(), Value::String(promotion.name.clone()));
        if let Some(description) = &promotion.description {
            props.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(image_url) = &promotion.image_url {
            props.insert("imageUrl".to_string(), Value::String(image_url.clone()));
        }
        props
    }
}

#[async_trait]
impl BlockResolver for PromotionBlock {
    async fn resolve(
        &self,
        props: &Props,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<Props>, ResolveError> {
        let promotion = match ContentSource::from_props(props) {
            ContentSource::Static => return Ok(None),
            ContentSource::Synced { selected_ids } => {
                let ids = parse_ids(&selected_ids);
                if ids.is_empty() {
                    return Ok(None);
                }
                let fetched = ctx.store.promotions_by_ids(&ids).await?;
                order_by_ids(&ids, fetched, |promotion| promotion.id)
                    .into_iter()
                    .next()
            }
            ContentSource::PerLocation => ctx
                .store
                .promotions_for_location(ctx.location_id)
                .await?
                .into_iter()
                .next(),
        };

        Ok(promotion.as_ref().map(Self::fields))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCard {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub href: String,
}

/// List of articles under `articles`.
pub struct ArticlesBlock {
    base_path: String,
}

impl Default for ArticlesBlock {
    fn default() -> Self {
        Self {
            base_path: "/articles".to_string(),
        }
    }
}

impl ArticlesBlock {
    pub const FIELD: &'static str = "articles";

    pub fn card(&self, article: &Article) -> ArticleCard {
        ArticleCard {
            id: article.id.to_string(),
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            image_url: article.image_url.clone(),
            href: format!("{}/{}", self.base_path, article.slug),
        }
    }
}

#[async_trait]
impl BlockResolver for ArticlesBlock {
    async fn resolve(
        &self,
        props: &Props,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<Props>, ResolveError> {
        let articles = match ContentSource::from_props(props) {
            ContentSource::Static => return Ok(None),
            ContentSource::Synced { selected_ids } => {
                let ids = parse_ids(&selected_ids);
                if ids.is_empty() {
                    return Ok(None);
                }
                let fetched = ctx.store.articles_by_ids(&ids).await?;
                order_by_ids(&ids, fetched, |article| article.id)
            }
            ContentSource::PerLocation => ctx.store.articles_for_location(ctx.location_id).await?,
        };

        if articles.is_empty() {
            return Ok(None);
        }

        let cards: Vec<ArticleCard> = articles.iter().map(|article| self.card(article)).collect();
        single_field(Self::FIELD, cards).map(Some)
    }
}
