//! SeaORM implementation of HotelRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::hotel::{Hotel, HotelRepository, HotelSearch, NewHotel};
use crate::domain::reservation::ReservationStatus;
use crate::domain::{BookingError, BookingResult};
use crate::infrastructure::database::entities::{hotel, reservation};

pub struct SeaOrmHotelRepository {
    db: DatabaseConnection,
}

impl SeaOrmHotelRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: hotel::Model) -> BookingResult<Hotel> {
    let capacity = |v: i32, field: &str| {
        u32::try_from(v)
            .map_err(|_| BookingError::Storage(format!("hotel {} has negative {}", m.id, field)))
    };

    Ok(Hotel {
        id: m.id,
        adults_per_room: capacity(m.adults_per_room, "adults_per_room")?,
        children_per_room: capacity(m.children_per_room, "children_per_room")?,
        name: m.name,
        city: m.city,
        country: m.country,
        nightly_rate_cents: m.nightly_rate_cents,
        pets_allowed: m.pets_allowed,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn to_i32(v: u32, field: &str) -> BookingResult<i32> {
    i32::try_from(v).map_err(|_| BookingError::Validation(format!("{} is too large", field)))
}

/// Translate search filters into one `Condition`. Every value is bound as a
/// parameter.
fn search_condition(filter: &HotelSearch) -> Condition {
    let mut cond = Condition::all();

    if let Some(destination) = filter
        .destination
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        let pattern = format!("%{}%", destination.to_lowercase());
        let lower = |col: hotel::Column| Expr::expr(Func::lower(Expr::col((hotel::Entity, col))));
        cond = cond.add(
            Condition::any()
                .add(lower(hotel::Column::City).like(pattern.clone()))
                .add(lower(hotel::Column::Country).like(pattern.clone()))
                .add(lower(hotel::Column::Name).like(pattern)),
        );
    }

    if let Some(party) = &filter.party {
        cond = cond
            .add(hotel::Column::AdultsPerRoom.gte(party.adults))
            .add(hotel::Column::ChildrenPerRoom.gte(party.children));
        if party.pets {
            cond = cond.add(hotel::Column::PetsAllowed.eq(true));
        }
    }

    if let Some(max) = filter.max_nightly_rate_cents {
        cond = cond.add(hotel::Column::NightlyRateCents.lte(max));
    }

    if let Some(stay) = &filter.stay {
        let blocking: Vec<&str> = ReservationStatus::blocking()
            .iter()
            .map(|s| s.as_str())
            .collect();
        let overlapping = Query::select()
            .expr(Expr::val(1))
            .from(reservation::Entity)
            .and_where(
                Expr::col((reservation::Entity, reservation::Column::HotelId))
                    .equals((hotel::Entity, hotel::Column::Id)),
            )
            .and_where(Expr::col((reservation::Entity, reservation::Column::Status)).is_in(blocking))
            .and_where(
                Expr::col((reservation::Entity, reservation::Column::Checkin)).lt(stay.checkout()),
            )
            .and_where(
                Expr::col((reservation::Entity, reservation::Column::Checkout)).gt(stay.checkin()),
            )
            .to_owned();
        cond = cond.add(Expr::exists(overlapping).not());
    }

    cond
}

// ── HotelRepository impl ────────────────────────────────────────

#[async_trait]
impl HotelRepository for SeaOrmHotelRepository {
    async fn find_by_id(&self, id: i32) -> BookingResult<Option<Hotel>> {
        hotel::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn create(&self, h: NewHotel) -> BookingResult<Hotel> {
        debug!("Creating hotel: {} ({})", h.name, h.city);

        if h.nightly_rate_cents < 0 {
            return Err(BookingError::Validation(
                "nightly rate must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let model = hotel::ActiveModel {
            id: NotSet,
            name: Set(h.name),
            city: Set(h.city),
            country: Set(h.country),
            nightly_rate_cents: Set(h.nightly_rate_cents),
            adults_per_room: Set(to_i32(h.adults_per_room, "adults_per_room")?),
            children_per_room: Set(to_i32(h.children_per_room, "children_per_room")?),
            pets_allowed: Set(h.pets_allowed),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await?;
        model_to_domain(inserted)
    }

    async fn update_nightly_rate(&self, id: i32, nightly_rate_cents: i64) -> BookingResult<Hotel> {
        debug!("Updating nightly rate of hotel {} to {}", id, nightly_rate_cents);

        if nightly_rate_cents < 0 {
            return Err(BookingError::Validation(
                "nightly rate must not be negative".to_string(),
            ));
        }

        let existing = hotel::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel", id))?;

        let mut active: hotel::ActiveModel = existing.into();
        active.nightly_rate_cents = Set(nightly_rate_cents);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        model_to_domain(updated)
    }

    async fn search(&self, filter: &HotelSearch) -> BookingResult<Vec<Hotel>> {
        let models = hotel::Entity::find()
            .filter(search_condition(filter))
            .order_by_asc(hotel::Column::NightlyRateCents)
            .order_by_asc(hotel::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(model_to_domain).collect()
    }
}
