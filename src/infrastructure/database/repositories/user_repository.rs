//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::domain::user::{NewUser, User, UserRepository, UserRole};
use crate::domain::{BookingError, BookingResult};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::User => UserRole::User,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::User => user::UserRole::User,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        first_name: model.first_name,
        last_name: model.last_name,
        role: entity_role_to_domain(model.role),
        created_at: model.created_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, u: NewUser) -> BookingResult<User> {
        debug!("Creating user: {}", u.username);

        let taken = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(u.username.as_str())
                    .or(user::Column::Email.eq(u.email.as_str())),
            )
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(BookingError::Validation(
                "Username or email already exists".to_string(),
            ));
        }

        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(u.username),
            email: Set(u.email),
            password_hash: Set(u.password_hash),
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            role: Set(domain_role_to_entity(u.role)),
            created_at: Set(Utc::now()),
        };

        let inserted = new_user.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
                BookingError::Validation("Username or email already exists".to_string())
            } else {
                BookingError::from(e)
            }
        })?;

        Ok(user_model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> BookingResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_login(&self, login: &str) -> BookingResult<Option<User>> {
        let model = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(login)
                    .or(user::Column::Email.eq(login)),
            )
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn count(&self) -> BookingResult<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }
}
