//! Payment provider adapters and webhook verification

pub mod offline;
pub mod signature;
pub mod stripe;

pub use offline::OfflinePaymentProvider;
pub use signature::{sign_payload, StripeSignatureVerifier, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
pub use stripe::{StripeCheckoutProvider, StripeConfig};
