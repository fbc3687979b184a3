use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::models::location::LocationError;
use services::services::relationship::RelationshipError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Relationship(#[from] RelationshipError),
    #[error("stored page is not a valid document: {0}")]
    CorruptPage(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Location(LocationError::InvalidSlug(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Location(LocationError::SlugTaken(_)) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ApiResponse::<()>::error(self.to_string());
        (status, ResponseJson(body)).into_response()
    }
}
