//! Stale reservation reaper scope and lifecycle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use justdreams_booking::application::{ReaperConfig, StaleReservationReaper};
use justdreams_booking::domain::{NewReservation, RepositoryProvider, Reservation, ReservationStatus};
use justdreams_booking::notifications::{create_event_bus, Event};
use justdreams_booking::shared::ShutdownSignal;

use common::*;

async fn insert_aged(
    repos: &dyn RepositoryProvider,
    hotel_id: i32,
    user_id: &str,
    dates: (&str, &str),
    age_hours: i64,
    status: ReservationStatus,
) -> Reservation {
    let mut new = NewReservation::pending(hotel_id, user_id, stay(dates.0, dates.1), adults(1), 100);
    new.status = status;
    new.created_at = Utc::now() - chrono::Duration::hours(age_hours);
    repos.reservations().insert_if_available(new).await.unwrap()
}

async fn reload(repos: &dyn RepositoryProvider, r: &Reservation) -> Reservation {
    repos
        .reservations()
        .find_by_id(r.id)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn only_old_pending_reservations_are_reaped() {
    let (_db, repos) = setup().await;
    let user = seed_user(repos.as_ref(), "guest").await;
    let hotel = seed_hotel(repos.as_ref(), "H", 100).await;

    let stale = insert_aged(
        repos.as_ref(),
        hotel.id,
        &user.id,
        ("2025-06-01", "2025-06-02"),
        25,
        ReservationStatus::Pending,
    )
    .await;
    let fresh = insert_aged(
        repos.as_ref(),
        hotel.id,
        &user.id,
        ("2025-06-02", "2025-06-03"),
        1,
        ReservationStatus::Pending,
    )
    .await;
    let old_paid = insert_aged(
        repos.as_ref(),
        hotel.id,
        &user.id,
        ("2025-06-03", "2025-06-04"),
        30,
        ReservationStatus::Paid,
    )
    .await;

    let bus = create_event_bus();
    let mut events = bus.subscribe();
    let reaper = StaleReservationReaper::new(repos.clone(), ReaperConfig::default()).with_events(bus);

    assert_eq!(reaper.run_once().await.unwrap(), 1);

    let reaped = reload(repos.as_ref(), &stale).await;
    assert_eq!(reaped.status, ReservationStatus::Cancelled);
    assert!(reaped.cancelled_at.is_some());
    assert_eq!(reload(repos.as_ref(), &fresh).await.status, ReservationStatus::Pending);
    assert_eq!(reload(repos.as_ref(), &old_paid).await.status, ReservationStatus::Paid);

    match events.recv().await.unwrap().event {
        Event::ReservationsReaped(e) => assert_eq!(e.count, 1),
        other => panic!("unexpected event {:?}", other),
    }

    // Nothing left to do; repeating is harmless and silent.
    assert_eq!(reaper.run_once().await.unwrap(), 0);
    assert!(
        tokio::time::timeout(Duration::from_millis(50), events.recv())
            .await
            .is_err(),
        "an empty sweep must not publish"
    );
}

#[tokio::test]
async fn reaped_dates_can_be_booked_again() {
    let h = Harness::new().await;
    let user = seed_user(h.repos.as_ref(), "guest").await;
    let hotel = seed_hotel(h.repos.as_ref(), "H", 100).await;

    h.ledger
        .create_pending(hotel.id, &user.id, stay("2025-06-01", "2025-06-05"), adults(1))
        .await
        .unwrap();

    let reaper = StaleReservationReaper::new(h.repos.clone(), ReaperConfig::default());
    let later = Utc::now() + chrono::Duration::hours(25);
    assert_eq!(reaper.run_once_at(later).await.unwrap(), 1);

    h.ledger
        .create_pending(hotel.id, &user.id, stay("2025-06-02", "2025-06-04"), adults(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn background_task_runs_and_stops() {
    let (_db, repos) = setup().await;
    let user = seed_user(repos.as_ref(), "guest").await;
    let hotel = seed_hotel(repos.as_ref(), "H", 100).await;
    let stale = insert_aged(
        repos.as_ref(),
        hotel.id,
        &user.id,
        ("2025-06-01", "2025-06-02"),
        48,
        ReservationStatus::Pending,
    )
    .await;

    let reaper = Arc::new(StaleReservationReaper::new(
        repos.clone(),
        ReaperConfig {
            interval: Duration::from_secs(3600),
            pending_timeout: chrono::Duration::hours(24),
        },
    ));
    let shutdown = ShutdownSignal::new();
    reaper.start(shutdown.clone());
    assert!(reaper.is_running());

    // The first tick fires immediately.
    let mut reaped = false;
    for _ in 0..50 {
        let row = reload(repos.as_ref(), &stale).await;
        if row.status == ReservationStatus::Cancelled {
            reaped = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(reaped);

    reaper.stop().await;
    assert!(!reaper.is_running());
}

#[tokio::test]
async fn shutdown_signal_ends_the_task() {
    let (_db, repos) = setup().await;
    let reaper = Arc::new(StaleReservationReaper::new(repos, ReaperConfig::default()));
    let shutdown = ShutdownSignal::new();
    reaper.start(shutdown.clone());

    shutdown.trigger();
    for _ in 0..50 {
        if !reaper.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!reaper.is_running());
}
