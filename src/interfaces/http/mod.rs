//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `middleware`: JWT authentication
//! - `modules`: handlers and DTOs per resource
//! - `router`: router assembly and the OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;

pub use common::{ApiError, ApiResponse, ValidatedJson};
pub use middleware::{AuthState, AuthenticatedUser};
pub use router::{create_api_router, ApiDoc};
pub use state::AppState;
