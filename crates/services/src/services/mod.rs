pub mod blocks;
pub mod config;
pub mod content_cache;
pub mod content_source;
pub mod content_store;
pub mod override_resolver;
pub mod relationship;
