//! Parsing of the `contentSource` descriptor embedded in node props.
//!
//! Anything missing or malformed is treated as static content: a broken
//! descriptor must never turn an authored block into an error.

use db::models::page::Props;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub const CONTENT_SOURCE_KEY: &str = "contentSource";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Use the props as authored.
    Static,
    /// One editor-curated ordered list shared by every location.
    Synced { selected_ids: Vec<String> },
    /// Each location's own selection, read from the junction table.
    /// Any id list cached in the descriptor is ignored.
    PerLocation,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum SourceKind {
    Static,
    Dynamic,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
enum DynamicMode {
    Synced,
    PerLocation,
}

impl ContentSource {
    pub fn from_props(props: &Props) -> Self {
        let Some(raw) = props.get(CONTENT_SOURCE_KEY) else {
            return Self::Static;
        };
        let Value::Object(descriptor) = raw else {
            debug!("Content source is not an object, treating as static");
            return Self::Static;
        };

        // Each field is read on its own so a bad field only affects itself.
        let source = descriptor.get("source").and_then(lenient::<SourceKind>);
        let mode = descriptor
            .get("dynamicMode")
            .and_then(lenient::<DynamicMode>)
            .or_else(|| descriptor.get("mode").and_then(lenient::<DynamicMode>));

        match (source, mode) {
            (Some(SourceKind::Dynamic), Some(DynamicMode::Synced)) => Self::Synced {
                selected_ids: descriptor
                    .get("selectedIds")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect(),
            },
            (Some(SourceKind::Dynamic), Some(DynamicMode::PerLocation)) => Self::PerLocation,
            _ => Self::Static,
        }
    }
}

fn lenient<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

/// Keeps the syntactically valid identifiers, in order. Malformed ids never reach storage.
pub fn parse_ids(raw: &[String]) -> Vec<Uuid> {
    raw.iter()
        .filter_map(|id| match Uuid::parse_str(id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                debug!(id = %id, "Skipping malformed content id");
                None
            }
        })
        .collect()
}
