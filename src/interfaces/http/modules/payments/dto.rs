//! Payment webhook DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::WebhookOutcome;

/// Acknowledgement returned to the payment provider.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
    /// `confirmed`, `duplicate` or `ignored`
    pub outcome: String,
    pub reservation_id: Option<i32>,
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        let (label, reservation_id) = match &outcome {
            WebhookOutcome::Confirmed(r) => ("confirmed", Some(r.id)),
            WebhookOutcome::Duplicate(r) => ("duplicate", Some(r.id)),
            WebhookOutcome::Ignored { .. } => ("ignored", None),
        };
        Self {
            received: true,
            outcome: label.to_string(),
            reservation_id,
        }
    }
}
