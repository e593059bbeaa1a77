//! User aggregate
//!
//! Contains the User entity, the acting-party type, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Actor, NewUser, User, UserRole};
pub use repository::UserRepository;
