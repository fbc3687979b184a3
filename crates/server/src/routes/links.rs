//! Routes for the relationship store. Every relation shares the same surface,
//! selected by the `{relation}` path segment (e.g. `location_product`).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::link::{Link, OverrideGroup, Relation};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LinkPair {
    pub left_id: Uuid,
    pub right_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LinkCreated {
    pub link_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LinkRemoved {
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SyncOverridesRequest {
    pub groups: Vec<OverrideGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SyncOverridesResponse {
    pub inserted: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkFilter {
    pub left_id: Option<Uuid>,
    pub right_id: Option<Uuid>,
}

/// POST /api/links/{relation}
pub async fn create_link(
    State(deployment): State<Deployment>,
    Path(relation): Path<Relation>,
    Json(pair): Json<LinkPair>,
) -> Result<ResponseJson<ApiResponse<LinkCreated>>, ApiError> {
    let link_id = deployment
        .relationships()
        .link(relation, pair.left_id, pair.right_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(LinkCreated { link_id })))
}

/// DELETE /api/links/{relation}?left_id=&right_id=
pub async fn delete_link(
    State(deployment): State<Deployment>,
    Path(relation): Path<Relation>,
    Query(pair): Query<LinkPair>,
) -> Result<ResponseJson<ApiResponse<LinkRemoved>>, ApiError> {
    let removed = deployment
        .relationships()
        .unlink(relation, pair.left_id, pair.right_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(LinkRemoved { removed })))
}

/// POST /api/links/{relation}/sync
pub async fn sync_overrides(
    State(deployment): State<Deployment>,
    Path(relation): Path<Relation>,
    Json(request): Json<SyncOverridesRequest>,
) -> Result<ResponseJson<ApiResponse<SyncOverridesResponse>>, ApiError> {
    let inserted = deployment
        .relationships()
        .sync_overrides(relation, &request.groups)
        .await?;
    Ok(ResponseJson(ApiResponse::success(SyncOverridesResponse {
        inserted,
    })))
}

/// GET /api/links/{relation}?left_id= or ?right_id=
pub async fn list_links(
    State(deployment): State<Deployment>,
    Path(relation): Path<Relation>,
    Query(filter): Query<LinkFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Link>>>, ApiError> {
    let relationships = deployment.relationships();
    let links = match (filter.left_id, filter.right_id) {
        (Some(left_id), None) => relationships.links_for_left(relation, left_id).await?,
        (None, Some(right_id)) => relationships.links_for_right(relation, right_id).await?,
        _ => {
            return Err(ApiError::BadRequest(
                "exactly one of left_id or right_id is required".to_string(),
            ));
        }
    };
    Ok(ResponseJson(ApiResponse::success(links)))
}

/// DELETE /api/links/{relation}/{link_id}
pub async fn remove_link_by_id(
    State(deployment): State<Deployment>,
    Path((relation, link_id)): Path<(Relation, Uuid)>,
) -> Result<ResponseJson<ApiResponse<LinkRemoved>>, ApiError> {
    let removed = deployment
        .relationships()
        .remove_link_by_id(relation, link_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(LinkRemoved { removed })))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().nest(
        "/links/{relation}",
        Router::new()
            .route("/", get(list_links).post(create_link).delete(delete_link))
            .route("/sync", post(sync_overrides))
            .route("/{link_id}", delete(remove_link_by_id)),
    )
}
