use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::Deployment;

pub mod articles;
pub mod health;
pub mod links;
pub mod locations;
pub mod pages;
pub mod products;
pub mod promotions;

pub fn router(deployment: Deployment) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(locations::router(&deployment))
        .merge(products::router(&deployment))
        .merge(promotions::router(&deployment))
        .merge(articles::router(&deployment))
        .merge(links::router(&deployment))
        .merge(pages::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(deployment)
}
