//! Error types for moa-api and their HTTP rendering.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use moa_auth::AuthError;

/// Result type alias for moa-api operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a handler can answer with.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Answered with `WWW-Authenticate: Bearer`.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Request data failed a validation rule (422).
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// Logged in full, reported to the client without detail.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code carried in `ErrorResponse::error`.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation { .. } => "validation_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn to_body(&self) -> ErrorResponse {
        let (message, details) = match self {
            ApiError::Internal(_) => ("Internal server error".to_string(), None),
            ApiError::Validation { field, message } => (
                message.clone(),
                field.as_ref().map(|field| json!({ "field": field })),
            ),
            other => (other.to_string(), None),
        };
        ErrorResponse {
            success: false,
            error: self.code(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let status = self.status();
        let mut response = (status, axum::Json(self.to_body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<moa_core::Error> for ApiError {
    fn from(err: moa_core::Error) -> Self {
        match err {
            moa_core::Error::NotFound { entity, .. } => ApiError::NotFound(not_found_message(entity)),
            moa_core::Error::Conflict(message) => ApiError::Conflict(message),
            moa_core::Error::Validation { field, message } => {
                ApiError::Validation { field, message }
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<moa_storage::Error> for ApiError {
    fn from(err: moa_storage::Error) -> Self {
        match err {
            moa_storage::Error::Core(core) => core.into(),
            moa_storage::Error::NotFound { entity, .. } => {
                ApiError::NotFound(not_found_message(entity))
            }
            dup @ moa_storage::Error::Duplicate { .. } => ApiError::Conflict(dup.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Inactive => ApiError::Forbidden("Account is inactive".to_string()),
            e if e.is_client_error() => ApiError::Unauthorized(capitalize(&e.to_string())),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation {
                field: None,
                message: e.body_text(),
            },
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

fn not_found_message(entity: &str) -> String {
    format!("{} not found", capitalize(entity))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_carries_field() {
        let response = ApiError::validation("userId", "too short").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "too short");
        assert_eq!(body["details"]["field"], "userId");
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::unauthorized("Invalid token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::internal("pool timed out").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_storage_errors_map_to_statuses() {
        let err: ApiError = moa_storage::Error::not_found("card", "x").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Card not found");

        let err: ApiError = moa_storage::Error::duplicate("card", "QR code").into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "card with this QR code already exists");

        let err: ApiError =
            moa_storage::Error::Core(moa_core::Error::validation_field("limit", "too big")).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        let err: ApiError = AuthError::Expired.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Token has expired");

        let err: ApiError = AuthError::Inactive.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err: ApiError = AuthError::Hashing("worker died".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
