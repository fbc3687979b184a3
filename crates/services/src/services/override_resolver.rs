//! Per-location resolution of dynamically bound page content.
//!
//! `resolve` walks every node of a page document and, for node types with a
//! registered [`BlockResolver`], replaces content fields with records fetched
//! for the target location. The input document is only borrowed; the result
//! is a new document with the same structure and node order.

use std::{collections::HashMap, sync::Arc};

use db::models::page::{ComponentNode, PageDocument};
use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    blocks::{ArticlesBlock, BlockResolver, ProductsBlock, PromotionBlock, ResolveContext},
    config::ResolverConfig,
    content_store::ContentStore,
};

pub struct OverrideResolver {
    store: Arc<dyn ContentStore>,
    blocks: HashMap<String, Arc<dyn BlockResolver>>,
}

impl OverrideResolver {
    /// A resolver with no registered block types; every node passes through.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            blocks: HashMap::new(),
        }
    }

    /// Registers the built-in product, promotion and article blocks.
    pub fn with_default_blocks(store: Arc<dyn ContentStore>, config: &ResolverConfig) -> Self {
        let mut resolver = Self::new(store);

        let products: Arc<dyn BlockResolver> =
            Arc::new(ProductsBlock::new(config.currency_prefix.clone()));
        resolver.register_shared("ProductsSection", products.clone());
        resolver.register_shared("ProductCarousel", products);
        resolver.register("PromotionBanner", PromotionBlock);
        resolver.register("ArticlesSection", ArticlesBlock::default());

        resolver
    }

    pub fn register(&mut self, kind: impl Into<String>, block: impl BlockResolver + 'static) {
        self.register_shared(kind, Arc::new(block));
    }

    pub fn register_shared(&mut self, kind: impl Into<String>, block: Arc<dyn BlockResolver>) {
        self.blocks.insert(kind.into(), block);
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.blocks.contains_key(kind)
    }

    /// Resolves every node of every zone concurrently. Never fails: a node
    /// whose content cannot be fetched keeps its authored props.
    pub async fn resolve(&self, document: &PageDocument, location_id: Uuid) -> PageDocument {
        let content = join_all(
            document
                .content
                .iter()
                .map(|node| self.resolve_node(node, location_id)),
        );
        let zones = join_all(document.zones.iter().map(|(name, nodes)| async move {
            let nodes = join_all(nodes.iter().map(|node| self.resolve_node(node, location_id))).await;
            (name.clone(), nodes)
        }));

        let (content, zones) = futures::join!(content, zones);

        debug!(
            location_id = %location_id,
            nodes = document.node_count(),
            "Resolved page document"
        );

        PageDocument {
            content,
            zones: zones.into_iter().collect(),
            root: document.root.clone(),
        }
    }

    async fn resolve_node(&self, node: &ComponentNode, location_id: Uuid) -> ComponentNode {
        let Some(block) = self.blocks.get(&node.kind) else {
            return node.clone();
        };

        let ctx = ResolveContext {
            location_id,
            store: self.store.as_ref(),
        };

        match block.resolve(&node.props, &ctx).await {
            Ok(Some(resolved)) => {
                let mut props = node.props.clone();
                props.extend(resolved);
                ComponentNode::new(node.kind.clone(), props)
            }
            Ok(None) => node.clone(),
            Err(e) => {
                warn!(
                    node_type = %node.kind,
                    location_id = %location_id,
                    error = %e,
                    "Failed to resolve dynamic content, keeping authored props"
                );
                node.clone()
            }
        }
    }
}
