use thiserror::Error;

/// Errors produced by the booking core and its storage adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("No room available for the requested stay")]
    Capacity,

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Reservation {0} is already finalized")]
    AlreadyFinalized(i32),

    #[error("Invalid payment notification signature: {0}")]
    InvalidSignature(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Lost a write race or hit a lock; the operation may succeed if retried.
    #[error("Storage conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Storage(String),

    #[error("Payment provider error: {0}")]
    Payment(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is transient and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sea_orm::DbErr> for BookingError {
    fn from(e: sea_orm::DbErr) -> Self {
        let msg = e.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("database is locked")
            || lower.contains("database is busy")
            || lower.contains("could not serialize")
            || lower.contains("deadlock")
        {
            Self::Conflict(msg)
        } else {
            Self::Storage(msg)
        }
    }
}

/// Result type for booking operations
pub type BookingResult<T> = Result<T, BookingError>;
