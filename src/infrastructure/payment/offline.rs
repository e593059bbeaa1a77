//! Offline payment provider for local development.

use async_trait::async_trait;
use tracing::warn;

use crate::application::ports::{CheckoutRequest, CheckoutSession, PaymentProvider};
use crate::domain::BookingResult;

/// Skips the provider entirely and sends the guest straight to the success
/// page. Nothing is charged; confirmations must be simulated with a signed
/// webhook.
#[derive(Debug, Clone)]
pub struct OfflinePaymentProvider {
    success_url: String,
}

impl OfflinePaymentProvider {
    pub fn new(success_url: impl Into<String>) -> Self {
        Self {
            success_url: success_url.into(),
        }
    }
}

#[async_trait]
impl PaymentProvider for OfflinePaymentProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BookingResult<CheckoutSession> {
        let session_id = format!("offline_{}", request.metadata.correlation_token);
        warn!(%session_id, "Offline payment provider in use; no charge was made");

        let separator = if self.success_url.contains('?') { '&' } else { '?' };
        Ok(CheckoutSession {
            redirect_url: format!("{}{}session_id={}", self.success_url, separator, session_id),
            session_id,
        })
    }
}
