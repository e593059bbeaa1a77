//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use crate::domain::reservation::{
    NewReservation, Party, Reservation, ReservationRepository, ReservationStatus, StayDates,
};
use crate::domain::{BookingError, BookingResult};
use crate::infrastructure::database::entities::{hotel, reservation};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> BookingResult<Reservation> {
    let adults = u32::try_from(m.adults)
        .map_err(|_| BookingError::Storage(format!("reservation {} has negative adults", m.id)))?;
    let children = u32::try_from(m.children).map_err(|_| {
        BookingError::Storage(format!("reservation {} has negative children", m.id))
    })?;

    Ok(Reservation {
        id: m.id,
        hotel_id: m.hotel_id,
        user_id: m.user_id,
        stay: StayDates::new(m.checkin, m.checkout)?,
        party: Party {
            adults,
            children,
            pets: m.pets,
        },
        status: m.status.parse()?,
        total_price_cents: m.total_price_cents,
        correlation_token: m.correlation_token,
        payment_reference: m.payment_reference,
        created_at: m.created_at,
        paid_at: m.paid_at,
        cancelled_at: m.cancelled_at,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> BookingResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

fn blocking_statuses() -> Vec<&'static str> {
    ReservationStatus::blocking()
        .iter()
        .map(|s| s.as_str())
        .collect()
}

/// `SELECT 1 FROM reservations WHERE <same hotel, blocking, overlapping>`
fn overlapping_query(hotel_id: i32, stay: &StayDates) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(reservation::Entity)
        .and_where(reservation::Column::HotelId.eq(hotel_id))
        .and_where(reservation::Column::Status.is_in(blocking_statuses()))
        .and_where(reservation::Column::Checkin.lt(stay.checkout()))
        .and_where(reservation::Column::Checkout.gt(stay.checkin()))
        .to_owned()
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn insert_if_available(&self, r: NewReservation) -> BookingResult<Reservation> {
        debug!(
            "Inserting {} reservation for hotel {} ({} → {})",
            r.status,
            r.hotel_id,
            r.stay.checkin(),
            r.stay.checkout()
        );

        let txn = self.db.begin().await?;
        let backend = txn.get_database_backend();

        // SQLite serializes writers itself; other backends take a row lock
        // on the hotel so concurrent inserts for it queue up.
        let hotel_query = hotel::Entity::find_by_id(r.hotel_id);
        let hotel_row = if backend == DatabaseBackend::Sqlite {
            hotel_query.one(&txn).await?
        } else {
            hotel_query.lock_exclusive().one(&txn).await?
        };
        if hotel_row.is_none() {
            txn.rollback().await?;
            return Err(BookingError::not_found("Hotel", r.hotel_id));
        }

        let values: Vec<SimpleExpr> = vec![
            Expr::val(r.hotel_id).into(),
            Expr::val(r.user_id.clone()).into(),
            Expr::val(r.stay.checkin()).into(),
            Expr::val(r.stay.checkout()).into(),
            Expr::val(r.party.adults as i32).into(),
            Expr::val(r.party.children as i32).into(),
            Expr::val(r.party.pets).into(),
            Expr::val(r.status.as_str()).into(),
            Expr::val(r.total_price_cents).into(),
            Expr::val(r.correlation_token.clone()).into(),
            Expr::val(r.payment_reference.clone()).into(),
            Expr::val(r.created_at).into(),
            Expr::val(paid_at_for(&r)).into(),
        ];

        let guarded = Query::select()
            .exprs(values)
            .and_where(Expr::exists(overlapping_query(r.hotel_id, &r.stay)).not())
            .to_owned();

        let insert = Query::insert()
            .into_table(reservation::Entity)
            .columns([
                reservation::Column::HotelId,
                reservation::Column::UserId,
                reservation::Column::Checkin,
                reservation::Column::Checkout,
                reservation::Column::Adults,
                reservation::Column::Children,
                reservation::Column::Pets,
                reservation::Column::Status,
                reservation::Column::TotalPriceCents,
                reservation::Column::CorrelationToken,
                reservation::Column::PaymentReference,
                reservation::Column::CreatedAt,
                reservation::Column::PaidAt,
            ])
            .select_from(guarded)
            .map_err(|e| BookingError::Storage(e.to_string()))?
            .to_owned();

        let result = txn.execute(backend.build(&insert)).await?;
        if result.rows_affected() == 0 {
            txn.rollback().await?;
            debug!(
                "Hotel {} already booked for {} → {}",
                r.hotel_id,
                r.stay.checkin(),
                r.stay.checkout()
            );
            return Err(BookingError::Capacity);
        }

        let model = reservation::Entity::find()
            .filter(reservation::Column::CorrelationToken.eq(r.correlation_token.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| BookingError::Storage("inserted reservation vanished".to_string()))?;
        txn.commit().await?;

        model_to_domain(model)
    }

    async fn find_by_id(&self, id: i32) -> BookingResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_correlation_token(&self, token: &str) -> BookingResult<Option<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::CorrelationToken.eq(token))
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_blocking(
        &self,
        hotel_id: i32,
        stay: &StayDates,
    ) -> BookingResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::HotelId.eq(hotel_id))
            .filter(reservation::Column::Status.is_in(blocking_statuses()))
            .filter(reservation::Column::Checkin.lt(stay.checkout()))
            .filter(reservation::Column::Checkout.gt(stay.checkin()))
            .order_by_asc(reservation::Column::Checkin)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn mark_paid(
        &self,
        id: i32,
        payment_reference: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> BookingResult<bool> {
        debug!("Marking reservation {} paid", id);

        let result = reservation::Entity::update_many()
            .col_expr(
                reservation::Column::Status,
                Expr::value(ReservationStatus::Paid.as_str()),
            )
            .col_expr(reservation::Column::PaymentReference, Expr::value(payment_reference))
            .col_expr(reservation::Column::PaidAt, Expr::value(paid_at))
            .filter(reservation::Column::Id.eq(id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn cancel(&self, id: i32, cancelled_at: DateTime<Utc>) -> BookingResult<bool> {
        debug!("Cancelling reservation {}", id);

        let result = reservation::Entity::update_many()
            .col_expr(
                reservation::Column::Status,
                Expr::value(ReservationStatus::Cancelled.as_str()),
            )
            .col_expr(reservation::Column::CancelledAt, Expr::value(cancelled_at))
            .filter(reservation::Column::Id.eq(id))
            .filter(reservation::Column::Status.is_in(blocking_statuses()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn list_for_user(&self, user_id: &str) -> BookingResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_desc(reservation::Column::Checkin)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn list_all(&self) -> BookingResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::Checkin)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn cancel_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        cancelled_at: DateTime<Utc>,
    ) -> BookingResult<u64> {
        let result = reservation::Entity::update_many()
            .col_expr(
                reservation::Column::Status,
                Expr::value(ReservationStatus::Cancelled.as_str()),
            )
            .col_expr(reservation::Column::CancelledAt, Expr::value(cancelled_at))
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .filter(reservation::Column::CreatedAt.lt(created_before))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Rows materialised directly as paid carry their creation time as paid time.
fn paid_at_for(r: &NewReservation) -> Option<DateTime<Utc>> {
    match r.status {
        ReservationStatus::Paid => Some(r.created_at),
        _ => None,
    }
}
