//! services/api/src/web/auth.rs
//!
//! Sign-in endpoints: login, registration, logout and the current user.
//! Credentials are compared as stored; there is no hashing or lockout.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fleet_core::{
    domain::{NewUser, User, UserRole},
    FleetError, Navigator, View,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email.
    pub username_or_email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[schema(value_type = String, example = "OPERATOR")]
    pub role: UserRole,
    pub assigned_site_id: Option<String>,
}

/// The public view of a user plus the page they should land on.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[schema(value_type = String, example = "ADMIN")]
    pub role: UserRole,
    pub assigned_site_id: Option<String>,
    #[schema(value_type = String, example = "SITES")]
    pub landing: View,
}

impl AuthResponse {
    fn new(user: User, landing: View) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            assigned_site_id: user.assigned_site_id,
            landing,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in with username or email
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let fleet = state.snapshot().await;
    let Some(user) = fleet.login(&req.username_or_email, &req.password).cloned() else {
        warn!("Failed login for '{}'", req.username_or_email);
        return Err(FleetError::InvalidCredentials.into());
    };

    state.gateway.set_current_user(Some(&user)).await?;
    state.reset_chat().await;
    info!("User {} signed in.", user.username);

    let landing = Navigator::landing(&user).view;
    Ok(Json(AuthResponse::new(user, landing)))
}

/// POST /auth/register - Create a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created; sign in next", body = AuthResponse),
        (status = 400, description = "Passwords differ or operator has no site"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password != req.confirm_password {
        return Err(FleetError::InvalidInput("Passwords do not match".to_string()).into());
    }

    let new_user = NewUser {
        username: req.username,
        full_name: req.full_name,
        email: req.email,
        password: req.password,
        role: req.role,
        assigned_site_id: req.assigned_site_id.filter(|id| !id.is_empty()),
    };
    let user = state.apply(|fleet| fleet.register(new_user)).await?;
    info!("Registered user {} ({:?}).", user.username, user.role);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(user, View::Login)),
    ))
}

/// POST /auth/logout - Clear the current user
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.gateway.set_current_user(None).await?;
    state.reset_chat().await;
    Ok(StatusCode::OK)
}

/// GET /auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .gateway
        .get_current_user()
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let landing = Navigator::landing(&user).view;
    Ok(Json(AuthResponse::new(user, landing)))
}
