//! Webhook signature verification
//!
//! Header format: `Stripe-Signature: t=<unix seconds>,v1=<hex>[,v1=<hex>...]`.
//! The expected `v1` is HMAC-SHA256 over `"<t>.<raw body>"` keyed by the
//! endpoint secret. Only after a match, and with `t` inside the tolerance
//! window, is the body decoded.

use std::collections::HashMap;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::application::ports::{BookingMetadata, PaymentEvent, PaymentNotificationVerifier};
use crate::domain::{BookingError, BookingResult};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Default accepted clock skew between the provider and us.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
const ASYNC_PAYMENT_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";

fn invalid(reason: &str) -> BookingError {
    BookingError::InvalidSignature(reason.to_string())
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> BookingResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| invalid("unusable webhook secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Build a header value for `payload`, as the provider would.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> BookingResult<String> {
    let mac = mac_for(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> BookingResult<ParsedHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| invalid("malformed timestamp"))?,
                )
            }
            "v1" => {
                // Undecodable candidates simply cannot match.
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(invalid("no v1 signature"));
    }
    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

#[derive(Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct CheckoutSessionObject {
    id: String,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Verifies and decodes Stripe checkout webhooks.
#[derive(Clone)]
pub struct StripeSignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl StripeSignatureVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Check the signature header against `payload` with the clock at `now`.
    pub fn verify_signature_at(
        &self,
        header: Option<&str>,
        payload: &[u8],
        now: i64,
    ) -> BookingResult<()> {
        if self.secret.is_empty() {
            return Err(invalid("webhook secret not configured"));
        }
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing signature header"))?;
        let parsed = parse_header(header)?;

        // `t` is caller-controlled and unauthenticated at this point.
        let tolerance = self.tolerance_secs.max(0).unsigned_abs();
        let skewed = now
            .checked_sub(parsed.timestamp)
            .map_or(true, |skew| skew.unsigned_abs() > tolerance);
        if skewed {
            return Err(invalid("timestamp outside tolerance"));
        }

        let matched = parsed.signatures.iter().any(|candidate| {
            mac_for(&self.secret, parsed.timestamp, payload)
                .map(|mac| mac.verify_slice(candidate).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(invalid("no matching signature"));
        }
        Ok(())
    }

    pub fn verify_at(
        &self,
        header: Option<&str>,
        payload: &[u8],
        now: i64,
    ) -> BookingResult<PaymentEvent> {
        self.verify_signature_at(header, payload, now)?;
        decode_event(payload)
    }
}

impl PaymentNotificationVerifier for StripeSignatureVerifier {
    fn verify(
        &self,
        signature_header: Option<&str>,
        payload: &[u8],
    ) -> BookingResult<PaymentEvent> {
        self.verify_at(signature_header, payload, Utc::now().timestamp())
    }
}

fn decode_event(payload: &[u8]) -> BookingResult<PaymentEvent> {
    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|e| BookingError::Validation(format!("malformed event payload: {}", e)))?;

    if event.event_type != CHECKOUT_COMPLETED && event.event_type != ASYNC_PAYMENT_SUCCEEDED {
        return Ok(PaymentEvent::Ignored {
            event_id: event.id,
            event_type: event.event_type,
        });
    }

    let session: CheckoutSessionObject = serde_json::from_value(event.data.object)
        .map_err(|e| BookingError::Validation(format!("malformed checkout session: {}", e)))?;

    // Sessions with delayed payment methods complete before the money lands;
    // the async_payment_succeeded event follows once it does.
    if let Some(status) = session.payment_status.as_deref() {
        if status != "paid" {
            return Ok(PaymentEvent::Ignored {
                event_id: event.id,
                event_type: format!("{} ({})", event.event_type, status),
            });
        }
    }

    let mut metadata_map = session.metadata;
    if let Some(reference) = session.client_reference_id {
        metadata_map
            .entry("correlation_token".to_string())
            .or_insert(reference);
    }
    let metadata = BookingMetadata::from_map(&metadata_map)?;

    Ok(PaymentEvent::CheckoutCompleted {
        event_id: event.id,
        session_id: session.id,
        metadata,
    })
}
