//! Configuration module
//!
//! One TOML file, every field optional:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! url = "sqlite://./justdreams.db?mode=rwc"
//!
//! [payment]
//! secret_key = "sk_live_..."
//! webhook_secret = "whsec_..."
//!
//! [reaper]
//! interval_secs = 43200
//! pending_timeout_hours = 24
//!
//! [mail]
//! enabled = true
//! smtp_host = "smtp.example.com"
//! from_email = "reservations@example.com"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ReaperConfig;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::mail::{MailConfig, SmtpSecurity};
use crate::infrastructure::payment::StripeConfig;
use crate::infrastructure::DatabaseConfig;

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "BOOKING_CONFIG";

/// `BOOKING_CONFIG` if set, else `<config dir>/justdreams-booking/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("justdreams-booking")
        .join("config.toml")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub payment: PaymentSection,
    pub reaper: ReaperSection,
    pub logging: LoggingSection,
    pub admin: AdminSection,
    pub mail: MailSection,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds
    pub connect_timeout: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
            min_connections: defaults.min_connections,
            connect_timeout: defaults.connect_timeout.as_secs(),
        }
    }
}

impl DatabaseSection {
    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        let defaults = JwtConfig::default();
        Self {
            jwt_secret: defaults.secret,
            jwt_expiration_hours: defaults.expiration_hours,
        }
    }
}

impl SecuritySection {
    pub fn to_jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_expiration_hours)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSection {
    pub api_base: String,
    /// Empty selects the offline provider
    pub secret_key: String,
    pub webhook_secret: String,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub signature_tolerance_secs: i64,
}

impl Default for PaymentSection {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            webhook_secret: String::new(),
            currency: "eur".to_string(),
            success_url: "http://localhost:8080/payment/success".to_string(),
            cancel_url: "http://localhost:8080/payment/cancel".to_string(),
            signature_tolerance_secs: crate::infrastructure::payment::DEFAULT_TOLERANCE_SECS,
        }
    }
}

impl PaymentSection {
    pub fn is_offline(&self) -> bool {
        self.secret_key.trim().is_empty()
    }

    pub fn to_stripe_config(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.api_base.clone(),
            secret_key: self.secret_key.clone(),
            currency: self.currency.to_lowercase(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperSection {
    pub interval_secs: u64,
    pub pending_timeout_hours: i64,
}

impl Default for ReaperSection {
    fn default() -> Self {
        Self {
            interval_secs: 43_200,
            pending_timeout_hours: 24,
        }
    }
}

impl ReaperSection {
    pub fn to_reaper_config(&self) -> ReaperConfig {
        ReaperConfig {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            pending_timeout: chrono::Duration::hours(self.pending_timeout_hours),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    /// Off keeps confirmations on the event bus only
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// "starttls", "tls" or "none"
    pub security: String,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: Option<String>,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            security: "starttls".to_string(),
            username: String::new(),
            password: String::new(),
            from_email: "reservations@justdreams.local".to_string(),
            from_name: "JustDreams Hotels".to_string(),
            reply_to: Some("support@justdreams.local".to_string()),
        }
    }
}

impl MailSection {
    pub fn to_mail_config(&self) -> crate::domain::BookingResult<MailConfig> {
        Ok(MailConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            security: SmtpSecurity::parse(&self.security)?,
            username: self.username.clone(),
            password: self.password.clone(),
            from_email: self.from_email.clone(),
            from_name: self.from_name.clone(),
            reply_to: self.reply_to.clone(),
        })
    }
}

/// Bootstrap admin, created when the user table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            email: "admin@justdreams.local".to_string(),
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}
