//! Stored page documents.
//!
//! A document is a default ordered list of component nodes plus named zones,
//! each holding its own ordered list. Node props are an open JSON map; only
//! block resolvers interpret them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

pub type Props = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct PageDocument {
    #[serde(default)]
    pub content: Vec<ComponentNode>,
    #[serde(default)]
    pub zones: BTreeMap<String, Vec<ComponentNode>>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    #[ts(type = "{ props?: Record<string, unknown> } | undefined")]
    pub root: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ComponentNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub props: Props,
}

impl ComponentNode {
    pub fn new(kind: impl Into<String>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props,
        }
    }
}

impl PageDocument {
    /// Total number of nodes across the default list and all zones.
    pub fn node_count(&self) -> usize {
        self.content.len() + self.zones.values().map(Vec::len).sum::<usize>()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub path: String,
    pub data: String, // JSON-serialized PageDocument
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SavePage {
    pub path: String,
    pub document: PageDocument,
}

/// Canonical form of a page path: one leading `/`, no trailing `/`, no
/// empty segments. The root page is `/`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.trim().is_empty()).collect();
    format!("/{}", segments.join("/"))
}

impl Page {
    /// Parse the stored JSON into a PageDocument
    pub fn document(&self) -> Result<PageDocument, serde_json::Error> {
        serde_json::from_str(&self.data)
    }

    /// Insert the page, or replace the document of the page already at `path`.
    pub async fn upsert(pool: &SqlitePool, data: &SavePage) -> Result<Self, sqlx::Error> {
        let json = serde_json::to_string(&data.document)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as::<_, Page>(
            r#"INSERT INTO pages (id, path, data)
            VALUES ($1, $2, $3)
            ON CONFLICT(path) DO UPDATE SET
                data = excluded.data,
                updated_at = datetime('now', 'subsec')
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(normalize_path(&data.path))
        .bind(json)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_path(pool: &SqlitePool, path: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE path = $1")
            .bind(normalize_path(path))
            .fetch_optional(pool)
            .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages ORDER BY path ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::DBService;

    fn sample_document() -> PageDocument {
        serde_json::from_value(json!({
            "content": [
                { "type": "Hero", "props": { "title": "Welcome", "id": "hero-1" } }
            ],
            "zones": {
                "sidebar": [{ "type": "FAQs", "props": { "items": [] } }]
            },
            "root": { "props": { "title": "Austin" } }
        }))
        .unwrap()
    }

    #[test]
    fn test_document_json_shape() {
        let doc = sample_document();
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.content[0].kind, "Hero");

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["content"][0]["type"], "Hero");
        assert_eq!(value["root"]["props"]["title"], "Austin");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc: PageDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.content.is_empty());
        assert!(doc.zones.is_empty());
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"content":[],"zones":{}}"#);
    }

    #[tokio::test]
    async fn test_upsert_replaces_document_at_path() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = Page::upsert(
            &db.pool,
            &SavePage {
                path: "texas/austin/south-lamar".to_string(),
                document: PageDocument::default(),
            },
        )
        .await
        .unwrap();

        let second = Page::upsert(
            &db.pool,
            &SavePage {
                path: "texas/austin/south-lamar".to_string(),
                document: sample_document(),
            },
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.path, "/texas/austin/south-lamar");
        assert_eq!(second.document().unwrap(), sample_document());
        assert_eq!(Page::find_all(&db.pool).await.unwrap().len(), 1);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("texas/austin/north"), "/texas/austin/north");
        assert_eq!(normalize_path("/texas/austin/north/"), "/texas/austin/north");
        assert_eq!(normalize_path("//texas//austin/north"), "/texas/austin/north");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[tokio::test]
    async fn test_path_forms_address_the_same_page() {
        let db = DBService::new_in_memory().await.unwrap();
        let saved = Page::upsert(
            &db.pool,
            &SavePage {
                path: "/about/".to_string(),
                document: sample_document(),
            },
        )
        .await
        .unwrap();

        let found = Page::find_by_path(&db.pool, "about").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);

        let replaced = Page::upsert(
            &db.pool,
            &SavePage {
                path: "about".to_string(),
                document: PageDocument::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(replaced.id, saved.id);
    }
}
