use async_trait::async_trait;

use super::model::{NewUser, User};
use crate::shared::BookingResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Validation` when the username or email is taken.
    async fn create(&self, user: NewUser) -> BookingResult<User>;

    async fn find_by_id(&self, id: &str) -> BookingResult<Option<User>>;

    /// Look up by username or email.
    async fn find_by_login(&self, login: &str) -> BookingResult<Option<User>>;

    async fn count(&self) -> BookingResult<u64>;
}
