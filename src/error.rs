//! API error taxonomy.
//!
//! Store and pool failures surface as HTTP 500 with an `{error}` body,
//! missing resources as 404, and a missing LLM credential as 503, matching
//! the facade's observable contract.

use thiserror::Error;

use crate::ai::InsightError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Insight(#[from] InsightError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(feature = "server")]
mod response {
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Json, Response};
    use serde_json::json;

    use super::ApiError;

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status = match &self {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ApiError::Insight(_) | ApiError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };

            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("request failed: {self}");
            }

            (status, Json(json!({ "error": self.to_string() }))).into_response()
        }
    }
}
