//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hotel_id: i32,
    pub user_id: String,

    pub checkin: Date,
    pub checkout: Date,

    pub adults: i32,
    pub children: i32,
    pub pets: bool,

    /// Reservation status: pending, paid, cancelled
    pub status: String,

    pub total_price_cents: i64,

    #[sea_orm(unique)]
    pub correlation_token: String,

    #[sea_orm(nullable)]
    pub payment_reference: Option<String>,

    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id"
    )]
    Hotel,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
