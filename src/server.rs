//! Booking service runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database and migrations,
//! service wiring, the stale-reservation reaper, the REST API and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::ports::{ConfirmationNotifier, PaymentNotificationVerifier, PaymentProvider};
use crate::application::{
    CheckoutService, PaymentConfirmationHandler, ReservationLedger, StaleReservationReaper,
};
use crate::config::{AdminSection, AppConfig, MailSection, PaymentSection};
use crate::domain::{BookingResult, NewUser, RepositoryProvider, UserRole};
use crate::infrastructure::crypto::hash_password;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::payment::{
    OfflinePaymentProvider, StripeCheckoutProvider, StripeSignatureVerifier,
};
use crate::infrastructure::init_database;
use crate::interfaces::http::{create_api_router, AppState};
use crate::infrastructure::SmtpMailer;
use crate::notifications::{
    create_event_bus, EventBusNotifier, FanoutNotifier, MailNotifier, SharedEventBus,
};
use crate::shared::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the booking service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin when the user table is empty (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running booking service.
///
/// ```rust,no_run
/// use justdreams_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub ledger: Arc<ReservationLedger>,
    pub reaper: Arc<StaleReservationReaper>,
    pub config: AppConfig,
    /// Port the API is listening on (resolved if 0 was configured).
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process; a second
/// server in the same process reuses it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

/// Stripe when a secret key is configured, otherwise the offline stand-in.
pub fn payment_provider(payment: &PaymentSection) -> BookingResult<Arc<dyn PaymentProvider>> {
    if payment.is_offline() {
        warn!("⚠️  No payment secret key configured, using the offline payment provider");
        return Ok(Arc::new(OfflinePaymentProvider::new(
            payment.success_url.clone(),
        )));
    }
    Ok(Arc::new(StripeCheckoutProvider::new(
        payment.to_stripe_config(),
    )?))
}

/// Guest mail plus the event bus when `[mail]` is enabled, else the bus alone.
pub fn confirmation_notifier(
    mail: &MailSection,
    repos: Arc<dyn RepositoryProvider>,
    bus: SharedEventBus,
) -> BookingResult<Arc<dyn ConfirmationNotifier>> {
    let bus_notifier: Arc<dyn ConfirmationNotifier> = Arc::new(EventBusNotifier::new(bus));
    if !mail.enabled {
        warn!("⚠️  Mail disabled; booking confirmations are only published on the event bus");
        return Ok(bus_notifier);
    }
    let mailer = Arc::new(SmtpMailer::new(mail.to_mail_config()?)?);
    let mail_notifier: Arc<dyn ConfirmationNotifier> = Arc::new(MailNotifier::new(repos, mailer));
    info!(host = %mail.smtp_host, port = mail.smtp_port, "Confirmation mail enabled");
    Ok(Arc::new(FanoutNotifier::new(vec![mail_notifier, bus_notifier])))
}

impl ServerHandle {
    /// Connect, migrate, wire the services, start the reaper and bind the API.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting JustDreams booking service...");

        let metrics = prometheus_handle();

        let db = init_database(&app_cfg.database.to_database_config()).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.create_default_admin {
            create_default_admin(repos.as_ref(), &app_cfg.admin).await;
        }

        let event_bus = create_event_bus();
        let jwt_config = app_cfg.security.to_jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        let ledger = Arc::new(ReservationLedger::new(repos.clone()).with_events(event_bus.clone()));

        let provider = payment_provider(&app_cfg.payment)?;
        let checkout = Arc::new(CheckoutService::new(
            repos.clone(),
            ledger.clone(),
            provider,
        ));

        if app_cfg.payment.webhook_secret.is_empty() {
            warn!("⚠️  No webhook secret configured; every payment notification will be rejected");
        }
        let verifier: Arc<dyn PaymentNotificationVerifier> = Arc::new(StripeSignatureVerifier::new(
            app_cfg.payment.webhook_secret.clone(),
            app_cfg.payment.signature_tolerance_secs,
        ));
        let notifier = confirmation_notifier(&app_cfg.mail, repos.clone(), event_bus.clone())?;
        let payments = Arc::new(PaymentConfirmationHandler::new(
            repos.clone(),
            ledger.clone(),
            verifier,
            notifier,
        ));

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let reaper = Arc::new(
            StaleReservationReaper::new(repos.clone(), app_cfg.reaper.to_reaper_config())
                .with_events(event_bus.clone()),
        );
        reaper.start(shutdown_signal.clone());

        let state = AppState {
            db: db.clone(),
            repos: repos.clone(),
            ledger: ledger.clone(),
            checkout,
            payments,
            reaper: reaper.clone(),
            jwt_config,
            password_cost: bcrypt::DEFAULT_COST,
            metrics,
            started_at: Instant::now(),
        };
        let api_router = create_api_router(state);

        let api_addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Booking service started");

        Ok(Self {
            event_bus,
            repos,
            ledger,
            reaper,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGTERM/SIGINT listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Signal every component to stop; see [`wait`](Self::wait).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API and the reaper to stop, then close the pool.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let Self {
            reaper,
            db,
            shutdown,
            api_task,
            ..
        } = self;

        shutdown
            .run_cleanup(async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                reaper.stop().await;
            })
            .await;

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Booking service shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("🛑 Shutting down booking service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Create the configured admin if no users exist yet.
async fn create_default_admin(repos: &dyn RepositoryProvider, admin: &AdminSection) {
    let users = repos.users();
    match users.count().await {
        Ok(0) => {}
        Ok(_) => return,
        Err(e) => {
            error!("Failed to count users: {}", e);
            return;
        }
    }

    info!("Creating default admin user...");
    let password_hash = match hash_password(&admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    let created = users
        .create(NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            first_name: "Admin".to_string(),
            last_name: String::new(),
            role: UserRole::Admin,
        })
        .await;

    match created {
        Ok(user) => {
            info!("Default admin created: {}", user.email);
            info!("⚠️  Please change the admin password immediately!");
        }
        Err(e) => error!("Failed to create admin user: {}", e),
    }
}

/// Initialize tracing from the logging section. `RUST_LOG` wins over the
/// configured level. Call once, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
