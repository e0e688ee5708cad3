use axum::{
    Json,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::CatalogError;

/// A catalog failure on its way back to an RPC caller.
#[derive(Debug)]
pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

// Tell axum how to convert `ApiError` into a response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response<Body> {
        let err = self.0;
        match &err {
            CatalogError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
            }
            CatalogError::AlreadyExists { id, .. } => (
                StatusCode::CONFLICT,
                Json(json!({ "error": err.to_string(), "id": id.to_string() })),
            )
                .into_response(),
            CatalogError::InvalidArgument(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response(),
            CatalogError::Internal { .. } => {
                log::error!("{err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Something went wrong" })),
                )
                    .into_response()
            }
        }
    }
}
