//! HTTP error responses
//!
//! Every failure leaves the service as a JSON body `{"error": "..."}`. The
//! message is the `Display` text of [`ApiError`]; the underlying store error
//! only goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request payload")]
    InvalidPayload,

    #[error("Invalid task id")]
    InvalidTaskId,

    #[error("Request payload too large")]
    PayloadTooLarge,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to fetch tasks")]
    ListTasks(#[source] tasks_core::Error),

    #[error("Failed to decode tasks")]
    DecodeTasks(#[source] tasks_core::Error),

    #[error("Failed to fetch task")]
    FetchTask(#[source] tasks_core::Error),

    #[error("Failed to create task")]
    CreateTask(#[source] tasks_core::Error),

    #[error("Failed to update task")]
    UpdateTask(#[source] tasks_core::Error),

    #[error("Failed to delete task")]
    DeleteTask(#[source] tasks_core::Error),
}

impl ApiError {
    /// A failed collection scan; unreadable documents are reported apart
    /// from query failures.
    pub fn listing(err: tasks_core::Error) -> Self {
        if err.is_decode() {
            Self::DecodeTasks(err)
        } else {
            Self::ListTasks(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload | Self::InvalidTaskId => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::TaskNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ListTasks(_)
            | Self::DecodeTasks(_)
            | Self::FetchTask(_)
            | Self::CreateTask(_)
            | Self::UpdateTask(_)
            | Self::DeleteTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(source) = std::error::Error::source(&self) {
            tracing::error!(error = %source, "{}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;

    #[test]
    fn test_listing_splits_decode_errors() {
        let err = ApiError::listing(tasks_core::Error::Decode("bad".into()));
        assert_eq!(err.to_string(), "Failed to decode tasks");

        let err = ApiError::listing(tasks_core::Error::Query("down".into()));
        assert_eq!(err.to_string(), "Failed to fetch tasks");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_response_is_json() {
        let response = ApiError::InvalidPayload.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Invalid request payload"}"#);
    }
}
