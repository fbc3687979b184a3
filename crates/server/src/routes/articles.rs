use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    article::{Article, CreateArticle, UpdateArticle},
    location::Location,
    product::Product,
    promotion::Promotion,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{Deployment, error::ApiError};

pub async fn create_article(
    State(deployment): State<Deployment>,
    axum::Json(payload): axum::Json<CreateArticle>,
) -> Result<ResponseJson<ApiResponse<Article>>, ApiError> {
    let article = Article::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(article)))
}

pub async fn list_articles(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = Article::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(articles)))
}

pub async fn get_article(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Article>>, ApiError> {
    let article = Article::find_by_id(&deployment.db().pool, article_id)
        .await?
        .ok_or(ApiError::NotFound("article"))?;
    Ok(ResponseJson(ApiResponse::success(article)))
}

pub async fn update_article(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateArticle>,
) -> Result<ResponseJson<ApiResponse<Article>>, ApiError> {
    let article = Article::update(&deployment.db().pool, article_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("article"))?;
    deployment.invalidate_content();
    Ok(ResponseJson(ApiResponse::success(article)))
}

pub async fn delete_article(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Article::delete(&deployment.db().pool, article_id).await?;
    deployment.invalidate_content();
    if removed == 0 {
        return Err(ApiError::NotFound("article"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn article_locations(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Location>>>, ApiError> {
    let locations = deployment
        .relationships()
        .locations_for_article(article_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(locations)))
}

pub async fn article_products(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = deployment
        .relationships()
        .products_for_article(article_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

pub async fn article_promotions(
    State(deployment): State<Deployment>,
    Path(article_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Promotion>>>, ApiError> {
    let promotions = deployment
        .relationships()
        .promotions_for_article(article_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(promotions)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .nest(
            "/articles/{article_id}",
            Router::new()
                .route(
                    "/",
                    get(get_article).put(update_article).delete(delete_article),
                )
                .route("/locations", get(article_locations))
                .route("/products", get(article_products))
                .route("/promotions", get(article_promotions)),
        )
}
