use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    location::Location,
    promotion::{CreatePromotion, Promotion, UpdatePromotion},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

pub async fn create_promotion(
    State(deployment): State<Deployment>,
    axum::Json(payload): axum::Json<CreatePromotion>,
) -> Result<ResponseJson<ApiResponse<Promotion>>, ApiError> {
    let promotion = Promotion::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(promotion)))
}

pub async fn list_promotions(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Promotion>>>, ApiError> {
    let promotions = Promotion::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(promotions)))
}

pub async fn get_promotion(
    State(deployment): State<Deployment>,
    Path(promotion_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Promotion>>, ApiError> {
    let promotion = Promotion::find_by_id(&deployment.db().pool, promotion_id)
        .await?
        .ok_or(ApiError::NotFound("promotion"))?;
    Ok(ResponseJson(ApiResponse::success(promotion)))
}

pub async fn update_promotion(
    State(deployment): State<Deployment>,
    Path(promotion_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdatePromotion>,
) -> Result<ResponseJson<ApiResponse<Promotion>>, ApiError> {
    let promotion = Promotion::update(&deployment.db().pool, promotion_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("promotion"))?;
    deployment.invalidate_content();
    Ok(ResponseJson(ApiResponse::success(promotion)))
}

pub async fn delete_promotion(
    State(deployment): State<Deployment>,
    Path(promotion_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Promotion::delete(&deployment.db().pool, promotion_id).await?;
    deployment.invalidate_content();
    if removed == 0 {
        return Err(ApiError::NotFound("promotion"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn promotion_locations(
    State(deployment): State<Deployment>,
    Path(promotion_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Location>>>, ApiError> {
    let locations = deployment
        .relationships()
        .locations_for_promotion(promotion_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(locations)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/promotions", get(list_promotions).post(create_promotion))
        .nest(
            "/promotions/{promotion_id}",
            Router::new()
                .route(
                    "/",
                    get(get_promotion)
                        .put(update_promotion)
                        .delete(delete_promotion),
                )
                .route("/locations", get(promotion_locations)),
        )
}
