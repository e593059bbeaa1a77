pub mod errors;
pub mod retry;
pub mod shutdown;

pub use errors::{BookingError, BookingResult};
pub use retry::{retry, RetryPolicy};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
