//! JSON body extractor that also runs `validator` rules.
//!
//! A body that does not parse is a 400 carrying the serde message. A body
//! that parses but breaks its rules is a 422 naming each failing field, in
//! field order, so clients get a stable message.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::{ApiError, ApiResponse};
use crate::domain::BookingError;

/// `Json<T>` whose payload already passed `T::validate()`.
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

/// `"field: message"` per violation, sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();

    if parts.is_empty() {
        "request body failed validation".to_string()
    } else {
        parts.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(rejection) => {
                ApiError(BookingError::Validation(rejection.body_text())).into_response()
            }
            Self::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<()>::error(describe(&errors))),
            )
                .into_response(),
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Malformed)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Guest {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1, max = 20))]
        adults: u32,
    }

    async fn post_guest(body: Body) -> (StatusCode, Value) {
        let app = Router::new().route(
            "/guests",
            post(|ValidatedJson(guest): ValidatedJson<Guest>| async move {
                format!("{} x{}", guest.name, guest.adults)
            }),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/guests")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn accepts_a_valid_body() {
        let (status, _) = post_guest(Body::from(json!({"name": "Ada", "adults": 2}).to_string())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, body) = post_guest(Body::from("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn rule_violations_name_every_field_in_order() {
        let (status, body) = post_guest(Body::from(json!({"name": "", "adults": 0}).to_string())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let message = body["error"].as_str().unwrap();
        let adults = message.find("adults").unwrap();
        let name = message.find("name: name is required").unwrap();
        assert!(adults < name, "{}", message);
    }
}
