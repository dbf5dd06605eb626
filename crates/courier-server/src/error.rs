//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courier_types::Error;
use serde::Serialize;
use utoipa::ToSchema;

/// API Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

/// Wrapper for Courier errors to implement IntoResponse
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(Error::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::QueueNotFound(_) => (StatusCode::NOT_FOUND, "QUEUE_NOT_FOUND"),
            Error::QueueAlreadyExists(_) => (StatusCode::CONFLICT, "QUEUE_ALREADY_EXISTS"),
            Error::TopicNotFound(_) => (StatusCode::NOT_FOUND, "TOPIC_NOT_FOUND"),
            Error::TopicAlreadyExists(_) => (StatusCode::CONFLICT, "TOPIC_ALREADY_EXISTS"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            Error::StreamingUnsupported(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STREAMING_UNSUPPORTED")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = Json(ApiErrorBody {
            error: self.0.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
