//! Stripe hosted-checkout client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::application::ports::{CheckoutRequest, CheckoutSession, PaymentProvider};
use crate::domain::{BookingError, BookingResult};

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// e.g. `https://api.stripe.com`
    pub api_base: String,
    pub secret_key: String,
    /// ISO currency code, lowercase
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

/// Creates Checkout Sessions through the Stripe REST API.
#[derive(Clone)]
pub struct StripeCheckoutProvider {
    config: StripeConfig,
    http_client: Client,
}

impl StripeCheckoutProvider {
    pub fn new(config: StripeConfig) -> BookingResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BookingError::Payment(format!("http client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Form fields of the session-create call.
    fn form(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let metadata = &request.metadata;
        let mut fields = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.config.success_url.clone()),
            ("cancel_url".to_string(), self.config.cancel_url.clone()),
            (
                "client_reference_id".to_string(),
                metadata.correlation_token.clone(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                metadata.total_price_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                format!(
                    "{} ({} → {})",
                    request.hotel_name, metadata.checkin, metadata.checkout
                ),
            ),
        ];
        fields.extend(
            metadata
                .to_pairs()
                .into_iter()
                .map(|(k, v)| (format!("metadata[{}]", k), v)),
        );
        fields
    }
}

#[async_trait]
impl PaymentProvider for StripeCheckoutProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BookingResult<CheckoutSession> {
        let url = format!(
            "{}/v1/checkout/sessions",
            self.config.api_base.trim_end_matches('/')
        );
        debug!(
            correlation_token = %request.metadata.correlation_token,
            "Creating Stripe checkout session"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&self.form(request))
            .send()
            .await
            .map_err(|e| BookingError::Payment(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(%status, body = %error_body, "Stripe checkout session failed");
            return Err(BookingError::Payment(format!(
                "checkout session rejected with status {}",
                status
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| BookingError::Payment(e.to_string()))?;
        let redirect_url = session
            .url
            .ok_or_else(|| BookingError::Payment("checkout session has no url".to_string()))?;

        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::BookingMetadata;
    use chrono::NaiveDate;

    #[test]
    fn form_carries_price_and_metadata() {
        let provider = StripeCheckoutProvider::new(StripeConfig {
            api_base: "https://api.stripe.com".into(),
            secret_key: "sk_test".into(),
            currency: "eur".into(),
            success_url: "https://example.test/ok".into(),
            cancel_url: "https://example.test/cancel".into(),
        })
        .unwrap();

        let request = CheckoutRequest {
            hotel_name: "Le Parisien Luxe".into(),
            metadata: BookingMetadata {
                correlation_token: "tok-1".into(),
                reservation_id: Some(9),
                hotel_id: 3,
                user_id: "u-1".into(),
                checkin: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                checkout: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
                adults: 2,
                children: 0,
                pets: false,
                total_price_cents: 40_000,
            },
        };

        let form = provider.form(&request);
        let get = |k: &str| {
            form.iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("client_reference_id"), Some("tok-1"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("40000"));
        assert_eq!(get("metadata[reservation_id]"), Some("9"));
        assert_eq!(get("metadata[checkout]"), Some("2025-06-05"));
    }
}
