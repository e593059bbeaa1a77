//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::domain::{BookingError, NewUser, UserRole};
use crate::infrastructure::crypto::{create_token, hash_password_with_cost, verify_password};
use crate::interfaces::http::common::{ok, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::AppState;

fn invalid_credentials() -> ApiError {
    BookingError::Unauthorized("invalid credentials".to_string()).into()
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Some(user) = state.repos.users().find_by_login(&request.username).await? else {
        return Err(invalid_credentials());
    };

    if !verify_password(&request.password, &user.password_hash).unwrap_or(false) {
        warn!(username = %user.username, "Failed login attempt");
        return Err(invalid_credentials());
    }

    let token = create_token(&user, &state.jwt_config)?;

    info!(user_id = %user.id, "User logged in");
    ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expires_in_secs(),
        user: user.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserInfo>),
        (status = 400, description = "Username or email taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let password_hash = hash_password_with_cost(&request.password, state.password_cost)
        .map_err(|e| BookingError::Storage(format!("password hashing failed: {}", e)))?;

    let user = state
        .repos
        .users()
        .create(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role: UserRole::User,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<UserInfo> {
    let db_user = state
        .repos
        .users()
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(|| BookingError::not_found("User", &user.user_id))?;

    ok(db_user.into())
}
