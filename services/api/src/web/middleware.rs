//! services/api/src/web/middleware.rs
//!
//! Sign-in middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use fleet_core::domain::{User, UserRole};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that loads the current user and inserts it into the request
/// extensions for handlers to use. Without a signed-in user the request is
/// answered with 401.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state
        .gateway
        .get_current_user()
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Refuses the request unless the user holds one of `roles`.
pub fn require_role(user: &User, roles: &[UserRole]) -> Result<(), ApiError> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        warn!("User {} ({:?}) refused: needs one of {:?}", user.username, user.role, roles);
        Err(ApiError::Forbidden)
    }
}
