use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    location::Location,
    product::{CreateProduct, Product, UpdateProduct},
    promotion::Promotion,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

pub async fn create_product(
    State(deployment): State<Deployment>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn list_products(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = Product::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

pub async fn get_product(
    State(deployment): State<Deployment>,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::find_by_id(&deployment.db().pool, product_id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn update_product(
    State(deployment): State<Deployment>,
    Path(product_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::update(&deployment.db().pool, product_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    deployment.invalidate_content();
    Ok(ResponseJson(ApiResponse::success(product)))
}

/// Deletes the product and its links. Pages keep their authored fallback.
pub async fn delete_product(
    State(deployment): State<Deployment>,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Product::delete(&deployment.db().pool, product_id).await?;
    deployment.invalidate_content();
    if removed == 0 {
        return Err(ApiError::NotFound("product"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn product_locations(
    State(deployment): State<Deployment>,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Location>>>, ApiError> {
    let locations = deployment
        .relationships()
        .locations_for_product(product_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(locations)))
}

pub async fn product_promotions(
    State(deployment): State<Deployment>,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Promotion>>>, ApiError> {
    let promotions = deployment
        .relationships()
        .promotions_for_product(product_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(promotions)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .nest(
            "/products/{product_id}",
            Router::new()
                .route(
                    "/",
                    get(get_product).put(update_product).delete(delete_product),
                )
                .route("/locations", get(product_locations))
                .route("/promotions", get(product_promotions)),
        )
}
