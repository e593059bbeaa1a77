//! Response envelope, error mapping and extractors shared by every handler

pub mod validated_json;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::BookingError;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Standard API response wrapper
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Error description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A `BookingError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::Validation(_) | BookingError::InvalidSignature(_) => {
                StatusCode::BAD_REQUEST
            }
            BookingError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookingError::Capacity
            | BookingError::AlreadyFinalized(_)
            | BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Payment(_) | BookingError::Notification(_) => StatusCode::BAD_GATEWAY,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            BookingError::Storage(detail) => {
                error!(error = %detail, "Storage failure while handling request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in a success envelope.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (BookingError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                BookingError::InvalidSignature("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (BookingError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (BookingError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (BookingError::not_found("Hotel", 1), StatusCode::NOT_FOUND),
            (BookingError::Capacity, StatusCode::CONFLICT),
            (BookingError::AlreadyFinalized(3), StatusCode::CONFLICT),
            (BookingError::Conflict("x".into()), StatusCode::CONFLICT),
            (BookingError::Payment("x".into()), StatusCode::BAD_GATEWAY),
            (
                BookingError::Storage("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err.clone()).status(), status, "{:?}", err);
        }
    }

    #[test]
    fn error_envelope_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"], "nope");
    }
}
