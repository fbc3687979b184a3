//! Routes for locations and their linked content.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    article::Article,
    location::{CreateLocation, Location, LocationSlug},
    product::Product,
    promotion::Promotion,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

pub async fn create_location(
    State(deployment): State<Deployment>,
    axum::Json(payload): axum::Json<CreateLocation>,
) -> Result<ResponseJson<ApiResponse<Location>>, ApiError> {
    let location = Location::create(&deployment.db().pool, &payload).await?;
    tracing::info!(location_id = %location.id, slug = %location.slug.path(), "Location created");
    Ok(ResponseJson(ApiResponse::success(location)))
}

pub async fn list_locations(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Location>>>, ApiError> {
    let locations = Location::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(locations)))
}

pub async fn get_location(
    State(deployment): State<Deployment>,
    Path(location_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Location>>, ApiError> {
    let location = Location::find_by_id(&deployment.db().pool, location_id)
        .await?
        .ok_or(ApiError::NotFound("location"))?;
    Ok(ResponseJson(ApiResponse::success(location)))
}

/// GET /api/locations/by-slug/{region}/{city}/{location}
pub async fn get_location_by_slug(
    State(deployment): State<Deployment>,
    Path((region, city, location)): Path<(String, String, String)>,
) -> Result<ResponseJson<ApiResponse<Location>>, ApiError> {
    let slug = LocationSlug::new(region, city, location);
    let location = Location::find_by_slug(&deployment.db().pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("location"))?;
    Ok(ResponseJson(ApiResponse::success(location)))
}

/// Deletes the location and its links; pages that reference it are kept.
pub async fn delete_location(
    State(deployment): State<Deployment>,
    Path(location_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Location::delete(&deployment.db().pool, location_id).await?;
    deployment.invalidate_location(location_id).await;
    if removed == 0 {
        return Err(ApiError::NotFound("location"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn location_products(
    State(deployment): State<Deployment>,
    Path(location_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = deployment
        .relationships()
        .products_for_location(location_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

pub async fn location_promotions(
    State(deployment): State<Deployment>,
    Path(location_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Promotion>>>, ApiError> {
    let promotions = deployment
        .relationships()
        .promotions_for_location(location_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(promotions)))
}

pub async fn location_articles(
    State(deployment): State<Deployment>,
    Path(location_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = deployment
        .relationships()
        .articles_for_location(location_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(articles)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/by-slug/{region}/{city}/{location}",
            get(get_location_by_slug),
        )
        .nest(
            "/locations/{location_id}",
            Router::new()
                .route("/", get(get_location).delete(delete_location))
                .route("/products", get(location_products))
                .route("/promotions", get(location_promotions))
                .route("/articles", get(location_articles)),
        )
}
