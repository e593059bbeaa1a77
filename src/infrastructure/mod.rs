//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod mail;
pub mod payment;

pub use database::{init_database, DatabaseConfig};
pub use mail::{MailConfig, SmtpMailer, SmtpSecurity};
pub use payment::{OfflinePaymentProvider, StripeCheckoutProvider, StripeSignatureVerifier};
