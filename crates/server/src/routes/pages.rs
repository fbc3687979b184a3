//! Page documents and their per-location resolution.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use db::models::{
    location::{Location, LocationSlug},
    page::{Page, PageDocument, SavePage, normalize_path},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PageResponse {
    pub id: Uuid,
    pub path: String,
    pub document: PageDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Page> for PageResponse {
    type Error = serde_json::Error;

    fn try_from(page: Page) -> Result<Self, Self::Error> {
        Ok(Self {
            document: page.document()?,
            id: page.id,
            path: page.path,
            created_at: page.created_at,
            updated_at: page.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveQuery {
    pub location_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ResolveDocumentRequest {
    pub location_id: Uuid,
    pub document: PageDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RenderedPage {
    pub location: Location,
    pub path: String,
    pub document: PageDocument,
}

/// PUT /api/pages
pub async fn save_page(
    State(deployment): State<Deployment>,
    Json(payload): Json<SavePage>,
) -> Result<ResponseJson<ApiResponse<PageResponse>>, ApiError> {
    let page = Page::upsert(&deployment.db().pool, &payload).await?;
    tracing::debug!(
        page_id = %page.id,
        path = %page.path,
        nodes = payload.document.node_count(),
        "Page saved"
    );
    Ok(ResponseJson(ApiResponse::success(page.try_into()?)))
}

pub async fn list_pages(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<PageResponse>>>, ApiError> {
    let pages = Page::find_all(&deployment.db().pool)
        .await?
        .into_iter()
        .map(PageResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(ApiResponse::success(pages)))
}

pub async fn get_page(
    State(deployment): State<Deployment>,
    Path(page_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<PageResponse>>, ApiError> {
    let page = load_page(&deployment, page_id).await?;
    Ok(ResponseJson(ApiResponse::success(page.try_into()?)))
}

pub async fn delete_page(
    State(deployment): State<Deployment>,
    Path(page_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Page::delete(&deployment.db().pool, page_id).await? == 0 {
        return Err(ApiError::NotFound("page"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/pages/{page_id}/resolve?location_id=
///
/// The stored document is never modified; only the response carries the
/// location's content.
pub async fn resolve_page(
    State(deployment): State<Deployment>,
    Path(page_id): Path<Uuid>,
    Query(query): Query<ResolveQuery>,
) -> Result<ResponseJson<ApiResponse<PageDocument>>, ApiError> {
    let document = load_page(&deployment, page_id).await?.document()?;
    let resolved = deployment
        .resolver()
        .resolve(&document, query.location_id)
        .await;
    Ok(ResponseJson(ApiResponse::success(resolved)))
}

/// POST /api/pages/resolve
///
/// Resolves an unsaved document, for editor previews.
pub async fn resolve_document(
    State(deployment): State<Deployment>,
    Json(request): Json<ResolveDocumentRequest>,
) -> Result<ResponseJson<ApiResponse<PageDocument>>, ApiError> {
    let resolved = deployment
        .resolver()
        .resolve(&request.document, request.location_id)
        .await;
    Ok(ResponseJson(ApiResponse::success(resolved)))
}

/// GET /api/render/{region}/{city}/{location}
///
/// Looks up the location by slug and resolves the page stored at the same
/// path for it.
pub async fn render_location_page(
    State(deployment): State<Deployment>,
    Path((region, city, location)): Path<(String, String, String)>,
) -> Result<ResponseJson<ApiResponse<RenderedPage>>, ApiError> {
    let pool = &deployment.db().pool;
    let slug = LocationSlug::new(region, city, location);
    let location = Location::find_by_slug(pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("location"))?;

    let path = normalize_path(&slug.path());
    let page = Page::find_by_path(pool, &path)
        .await?
        .ok_or(ApiError::NotFound("page"))?;

    let document = deployment
        .resolver()
        .resolve(&page.document()?, location.id)
        .await;
    Ok(ResponseJson(ApiResponse::success(RenderedPage {
        location,
        path,
        document,
    })))
}

async fn load_page(deployment: &Deployment, page_id: Uuid) -> Result<Page, ApiError> {
    Page::find_by_id(&deployment.db().pool, page_id)
        .await?
        .ok_or(ApiError::NotFound("page"))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/pages", get(list_pages).put(save_page))
        .route("/pages/resolve", post(resolve_document))
        .nest(
            "/pages/{page_id}",
            Router::new()
                .route("/", get(get_page).delete(delete_page))
                .route("/resolve", get(resolve_page)),
        )
        .route(
            "/render/{region}/{city}/{location}",
            get(render_location_page),
        )
}
