//! services/api/src/web/dispatch.rs
//!
//! Customer bookings and the dispatch desk.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use fleet_core::domain::{Booking, NewBooking, Truck, User, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::{middleware::require_role, state::AppState};

const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Operator];

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// An idle truck of the booking's vehicle class.
    pub truck_id: String,
}

/// The dispatch board: bookings waiting for a vehicle and bookings in flight.
#[derive(Serialize)]
pub struct DispatchBoard {
    pub pending: Vec<Booking>,
    pub active: Vec<Booking>,
}

/// GET /bookings - Customers only see their own bookings
#[utoipa::path(
    get,
    path = "/bookings",
    responses(
        (status = 200, description = "Bookings; customers see their own"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<Vec<Booking>> {
    let fleet = state.snapshot().await;
    let bookings = match user.role {
        UserRole::Customer => fleet
            .bookings_for_customer(&user.id)
            .into_iter()
            .cloned()
            .collect(),
        UserRole::Admin | UserRole::Operator => fleet.bookings,
    };
    Json(bookings)
}

/// POST /bookings - Opens a booking in SEARCHING with a quoted price
#[utoipa::path(
    post,
    path = "/bookings",
    request_body(
        content_type = "application/json",
        description = "Vehicle class, pickup, drop and load details."
    ),
    responses(
        (status = 201, description = "Booking opened in SEARCHING"),
        (status = 400, description = "Vehicle class is not offered"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new_booking): Json<NewBooking>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .apply(|fleet| fleet.create_booking(&user, new_booking))
        .await?;
    info!(booking_id = %booking.id, price = booking.price, "Booking created.");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /bookings/{id} - Drives the later trip states
#[utoipa::path(
    put,
    path = "/bookings/{id}",
    params(("id" = String, Path, description = "Booking id")),
    request_body(
        content_type = "application/json",
        description = "The whole booking record; truck, customer, price and time stay as stored."
    ),
    responses(
        (status = 200, description = "Booking updated"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown booking"),
        (status = 409, description = "Status change not allowed")
    )
)]
pub async fn update_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    Json(mut booking): Json<Booking>,
) -> Result<Json<Booking>, ApiError> {
    require_role(&user, STAFF)?;
    booking.id = booking_id;
    let updated = state.apply(|fleet| fleet.update_booking(booking)).await?;
    info!(booking_id = %updated.id, status = ?updated.status, "Booking updated.");
    Ok(Json(updated))
}

/// GET /dispatch
#[utoipa::path(
    get,
    path = "/dispatch",
    responses(
        (status = 200, description = "Pending and active bookings"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only")
    )
)]
pub async fn dispatch_board_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<DispatchBoard>, ApiError> {
    require_role(&user, STAFF)?;
    let fleet = state.snapshot().await;
    Ok(Json(DispatchBoard {
        pending: fleet.pending_bookings().into_iter().cloned().collect(),
        active: fleet.active_bookings().into_iter().cloned().collect(),
    }))
}

/// GET /dispatch/{booking_id}/candidates - Idle trucks of the requested class
#[utoipa::path(
    get,
    path = "/dispatch/{booking_id}/candidates",
    params(("booking_id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Idle trucks of the booked class"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown booking")
    )
)]
pub async fn candidates_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
) -> Result<Json<Vec<Truck>>, ApiError> {
    require_role(&user, STAFF)?;
    let fleet = state.snapshot().await;
    let candidates = fleet.candidates_for(&booking_id)?;
    Ok(Json(candidates.into_iter().cloned().collect()))
}

/// POST /dispatch/{booking_id}/assign - Binds a searching booking to an idle truck
#[utoipa::path(
    post,
    path = "/dispatch/{booking_id}/assign",
    params(("booking_id" = String, Path, description = "Booking to dispatch")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Booking assigned"),
        (status = 403, description = "Customers cannot dispatch"),
        (status = 404, description = "Unknown booking or truck"),
        (status = 409, description = "Booking not searching, truck not idle, or class mismatch")
    )
)]
pub async fn assign_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Booking>, ApiError> {
    require_role(&user, STAFF)?;
    let booking = state
        .apply(|fleet| {
            let next = fleet.assign(&booking_id, &req.truck_id)?;
            let booking = next
                .booking(&booking_id)
                .cloned()
                .ok_or_else(|| fleet_core::FleetError::UnknownBooking(booking_id.clone()))?;
            Ok((next, booking))
        })
        .await?;
    Ok(Json(booking))
}
