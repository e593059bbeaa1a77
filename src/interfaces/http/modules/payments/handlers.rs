//! Payment provider webhook

use axum::{body::Bytes, extract::State, http::HeaderMap};

use super::dto::WebhookAck;
use crate::infrastructure::payment::SIGNATURE_HEADER;
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult};
use crate::interfaces::http::state::AppState;

/// Authenticated by the `Stripe-Signature` header over the raw body, not by JWT.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    tag = "Payments",
    request_body(content = String, description = "Raw provider event", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>")),
    responses(
        (status = 200, description = "Event accepted (also for repeats)", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Bad signature or malformed event; nothing written"),
        (status = 409, description = "Paid stay conflicts with the ledger; needs manual refund")
    )
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<WebhookAck> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state.payments.handle(signature, &body).await?;
    ok(outcome.into())
}
