//! Stale Reservation Reaper
//!
//! Background task that cancels pending reservations nobody paid for within
//! the timeout, releasing their dates. Paid and cancelled rows are never
//! touched. Each run is one conditional batch update, so re-running it is
//! harmless.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::{BookingResult, RepositoryProvider};
use crate::notifications::{Event, ReapedEvent, SharedEventBus};
use crate::shared::ShutdownSignal;

#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Time between runs
    pub interval: Duration,
    /// Age after which a pending reservation is abandoned
    pub pending_timeout: chrono::Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(12 * 60 * 60),
            pending_timeout: chrono::Duration::hours(24),
        }
    }
}

struct RunningTask {
    handle: JoinHandle<()>,
    stop: ShutdownSignal,
}

pub struct StaleReservationReaper {
    repos: Arc<dyn RepositoryProvider>,
    config: ReaperConfig,
    events: Option<SharedEventBus>,
    task: Mutex<Option<RunningTask>>,
}

impl StaleReservationReaper {
    pub fn new(repos: Arc<dyn RepositoryProvider>, config: ReaperConfig) -> Self {
        Self {
            repos,
            config,
            events: None,
            task: Mutex::new(None),
        }
    }

    pub fn with_events(mut self, events: SharedEventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &ReaperConfig {
        &self.config
    }

    /// Spawn the periodic task. The first run happens immediately. The task
    /// ends on [`stop`](Self::stop) or when `shutdown` fires.
    pub fn start(self: &Arc<Self>, shutdown: ShutdownSignal) {
        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            warn!("🧹 Stale reservation reaper already running");
            return;
        }

        let stop = ShutdownSignal::new();
        let reaper = Arc::clone(self);
        let task_stop = stop.clone();
        let interval_secs = self.config.interval.as_secs();

        let handle = tokio::spawn(async move {
            info!(
                interval_secs,
                timeout_hours = reaper.config.pending_timeout.num_hours(),
                "🧹 Stale reservation reaper started"
            );

            let mut interval = tokio::time::interval(reaper.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = reaper.run_once().await {
                            error!(error = %e, "Stale reservation sweep failed");
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("🧹 Stale reservation reaper shutting down");
                        break;
                    }
                    _ = task_stop.wait() => break,
                }
            }

            info!("🧹 Stale reservation reaper stopped");
        });

        *slot = Some(RunningTask { handle, stop });
    }

    /// Stop the periodic task and wait for it to finish.
    pub async fn stop(&self) {
        let running = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(RunningTask { handle, stop }) = running {
            stop.trigger();
            if let Err(e) = handle.await {
                warn!(error = %e, "Reaper task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    pub async fn run_once(&self) -> BookingResult<u64> {
        self.run_once_at(Utc::now()).await
    }

    /// One sweep as if the clock read `now`.
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> BookingResult<u64> {
        let cutoff = now - self.config.pending_timeout;
        let count = self
            .repos
            .reservations()
            .cancel_stale_pending(cutoff, now)
            .await?;

        if count == 0 {
            debug!(%cutoff, "No stale pending reservations");
            return Ok(0);
        }

        info!(count, %cutoff, "Cancelled stale pending reservations");
        metrics::counter!("reservations_reaped_total").increment(count);

        if let Some(bus) = &self.events {
            bus.publish(Event::ReservationsReaped(ReapedEvent {
                count,
                cutoff,
                timestamp: now,
            }));
        }

        Ok(count)
    }
}
