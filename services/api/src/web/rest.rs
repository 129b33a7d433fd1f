//! services/api/src/web/rest.rs
//!
//! Handlers for sites, trucks, log records, the vehicle catalog and the
//! dashboard, plus the master definition for the OpenAPI document.

use crate::error::ApiError;
use crate::web::{auth, dispatch, insights, maintenance, middleware::require_role, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use fleet_core::{
    domain::{
        LogRecord, NewRecord, NewSite, NewTruck, NewVehicleType, ServiceRequest, Site, Truck,
        User, UserRole, VehicleType,
    },
    FleetSummary,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::logout_handler,
        auth::me_handler,
        list_sites_handler,
        add_site_handler,
        update_site_handler,
        delete_site_handler,
        site_trucks_handler,
        list_trucks_handler,
        add_truck_handler,
        update_truck_handler,
        delete_truck_handler,
        truck_records_handler,
        add_record_handler,
        delete_record_handler,
        list_vehicle_types_handler,
        add_vehicle_type_handler,
        update_vehicle_type_handler,
        toggle_vehicle_type_handler,
        dashboard_handler,
        dispatch::list_bookings_handler,
        dispatch::create_booking_handler,
        dispatch::update_booking_handler,
        dispatch::dispatch_board_handler,
        dispatch::candidates_handler,
        dispatch::assign_handler,
        maintenance::list_service_requests_handler,
        maintenance::create_service_request_handler,
        maintenance::toggle_task_handler,
        insights::history_handler,
        insights::ask_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::RegisterRequest,
            auth::AuthResponse,
            dispatch::AssignRequest,
            insights::InsightPrompt,
        )
    ),
    tags(
        (name = "Fleet Desk API", description = "Sites, trucks, bookings and fleet maintenance.")
    )
)]
pub struct ApiDoc;

const ADMIN: &[UserRole] = &[UserRole::Admin];
const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Operator];

//=========================================================================================
// Sites
//=========================================================================================

/// GET /sites - Sites visible to the signed-in user
#[utoipa::path(
    get,
    path = "/sites",
    responses(
        (status = 200, description = "Sites visible to the user"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn list_sites_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<Vec<Site>> {
    let fleet = state.snapshot().await;
    Json(fleet.visible_sites(&user).into_iter().cloned().collect())
}

/// POST /sites
#[utoipa::path(
    post,
    path = "/sites",
    request_body(
        content_type = "application/json",
        description = "Name, location and coordinates of the new site."
    ),
    responses(
        (status = 201, description = "Site created"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn add_site_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new_site): Json<NewSite>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, ADMIN)?;
    let site = state
        .apply(|fleet| Ok(fleet.add_site(new_site)))
        .await?;
    info!("Site {} added.", site.id);
    Ok((StatusCode::CREATED, Json(site)))
}

/// PUT /sites/{id}
#[utoipa::path(
    put,
    path = "/sites/{id}",
    params(("id" = String, Path, description = "Site id")),
    request_body(content_type = "application/json", description = "The whole site record."),
    responses(
        (status = 200, description = "Site updated"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown site")
    )
)]
pub async fn update_site_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(site_id): Path<String>,
    Json(mut site): Json<Site>,
) -> Result<Json<Site>, ApiError> {
    require_role(&user, ADMIN)?;
    site.id = site_id;
    let updated = site.clone();
    state.apply_state(|fleet| fleet.update_site(site)).await?;
    Ok(Json(updated))
}

/// DELETE /sites/{id} - Removes the site, its trucks and their records
#[utoipa::path(
    delete,
    path = "/sites/{id}",
    params(("id" = String, Path, description = "Site id")),
    responses(
        (status = 204, description = "Site, its trucks and their records removed"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown site"),
        (status = 409, description = "A truck at the site serves an open booking")
    )
)]
pub async fn delete_site_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(site_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, ADMIN)?;
    state.apply_state(|fleet| fleet.delete_site(&site_id)).await?;
    info!("Site {} deleted.", site_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /sites/{id}/trucks
#[utoipa::path(
    get,
    path = "/sites/{id}/trucks",
    params(("id" = String, Path, description = "Site id")),
    responses(
        (status = 200, description = "Trucks stationed at the site"),
        (status = 401, description = "Nobody is signed in"),
        (status = 404, description = "Unknown site")
    )
)]
pub async fn site_trucks_handler(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
) -> Result<Json<Vec<Truck>>, ApiError> {
    let fleet = state.snapshot().await;
    if fleet.site(&site_id).is_none() {
        return Err(fleet_core::FleetError::UnknownSite(site_id).into());
    }
    Ok(Json(fleet.trucks_at_site(&site_id).into_iter().cloned().collect()))
}

//=========================================================================================
// Trucks
//=========================================================================================

/// GET /trucks
#[utoipa::path(
    get,
    path = "/trucks",
    responses(
        (status = 200, description = "Every truck"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn list_trucks_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Truck>> {
    Json(state.snapshot().await.trucks)
}

/// POST /trucks
#[utoipa::path(
    post,
    path = "/trucks",
    request_body(
        content_type = "application/json",
        description = "Number, site, vehicle class and driver of the new truck."
    ),
    responses(
        (status = 201, description = "Truck registered, idle"),
        (status = 400, description = "Unknown site"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn add_truck_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new_truck): Json<NewTruck>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, ADMIN)?;
    let truck = state.apply(|fleet| fleet.add_truck(new_truck)).await?;
    info!("Truck {} registered at {}.", truck.truck_number, truck.site_id);
    Ok((StatusCode::CREATED, Json(truck)))
}

/// PUT /trucks/{id}
#[utoipa::path(
    put,
    path = "/trucks/{id}",
    params(("id" = String, Path, description = "Truck id")),
    request_body(content_type = "application/json", description = "The whole truck record."),
    responses(
        (status = 200, description = "Truck updated"),
        (status = 400, description = "Percentage out of range or status reserved for dispatch"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown truck or site"),
        (status = 409, description = "Status is locked while the truck serves an open booking")
    )
)]
pub async fn update_truck_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(truck_id): Path<String>,
    Json(mut truck): Json<Truck>,
) -> Result<Json<Truck>, ApiError> {
    require_role(&user, ADMIN)?;
    truck.id = truck_id;
    let updated = truck.clone();
    state.apply_state(|fleet| fleet.update_truck(truck)).await?;
    info!("Truck {} updated.", updated.id);
    Ok(Json(updated))
}

/// DELETE /trucks/{id} - Removes the truck and its records
#[utoipa::path(
    delete,
    path = "/trucks/{id}",
    params(("id" = String, Path, description = "Truck id")),
    responses(
        (status = 204, description = "Truck and its records removed"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown truck"),
        (status = 409, description = "The truck serves an open booking")
    )
)]
pub async fn delete_truck_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(truck_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, ADMIN)?;
    state.apply_state(|fleet| fleet.delete_truck(&truck_id)).await?;
    info!("Truck {} deleted.", truck_id);
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Log records
//=========================================================================================

/// GET /trucks/{id}/records - Newest first
#[utoipa::path(
    get,
    path = "/trucks/{id}/records",
    params(("id" = String, Path, description = "Truck id")),
    responses(
        (status = 200, description = "Records for the truck, newest first"),
        (status = 401, description = "Nobody is signed in"),
        (status = 404, description = "Unknown truck")
    )
)]
pub async fn truck_records_handler(
    State(state): State<Arc<AppState>>,
    Path(truck_id): Path<String>,
) -> Result<Json<Vec<LogRecord>>, ApiError> {
    let fleet = state.snapshot().await;
    if fleet.truck(&truck_id).is_none() {
        return Err(fleet_core::FleetError::UnknownTruck(truck_id).into());
    }
    Ok(Json(fleet.records_for_truck(&truck_id).into_iter().cloned().collect()))
}

/// POST /trucks/{id}/records
#[utoipa::path(
    post,
    path = "/trucks/{id}/records",
    params(("id" = String, Path, description = "Truck id")),
    request_body(
        content_type = "application/json",
        description = "Material, quantity, type and optional GPS, notes and POD image."
    ),
    responses(
        (status = 201, description = "Record added"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown truck")
    )
)]
pub async fn add_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(truck_id): Path<String>,
    Json(mut new_record): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, STAFF)?;
    new_record.truck_id = truck_id;
    let record = state.apply(|fleet| fleet.add_record(new_record)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /records/{id}
#[utoipa::path(
    delete,
    path = "/records/{id}",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record removed"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown record")
    )
)]
pub async fn delete_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, STAFF)?;
    state
        .apply_state(|fleet| fleet.delete_record(&record_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Vehicle catalog
//=========================================================================================

/// GET /vehicle-types - Customers only see active classes
#[utoipa::path(
    get,
    path = "/vehicle-types",
    responses(
        (status = 200, description = "Vehicle catalog; customers see active classes only"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn list_vehicle_types_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<Vec<VehicleType>> {
    let fleet = state.snapshot().await;
    let types = match user.role {
        UserRole::Customer => fleet.active_vehicle_types().into_iter().cloned().collect(),
        UserRole::Admin | UserRole::Operator => fleet.vehicle_types,
    };
    Json(types)
}

/// POST /vehicle-types
#[utoipa::path(
    post,
    path = "/vehicle-types",
    request_body(
        content_type = "application/json",
        description = "Name, capacity, dimensions and pricing of the class."
    ),
    responses(
        (status = 201, description = "Vehicle type added, active"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn add_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new_type): Json<NewVehicleType>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, ADMIN)?;
    let vehicle_type = state
        .apply(|fleet| Ok(fleet.add_vehicle_type(new_type)))
        .await?;
    Ok((StatusCode::CREATED, Json(vehicle_type)))
}

/// PUT /vehicle-types/{id}
#[utoipa::path(
    put,
    path = "/vehicle-types/{id}",
    params(("id" = String, Path, description = "Vehicle type id")),
    request_body(content_type = "application/json", description = "The whole vehicle type record."),
    responses(
        (status = 200, description = "Vehicle type updated"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown vehicle type")
    )
)]
pub async fn update_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(vehicle_type_id): Path<String>,
    Json(mut vehicle_type): Json<VehicleType>,
) -> Result<Json<VehicleType>, ApiError> {
    require_role(&user, ADMIN)?;
    vehicle_type.id = vehicle_type_id;
    let updated = vehicle_type.clone();
    state
        .apply_state(|fleet| fleet.update_vehicle_type(vehicle_type))
        .await?;
    Ok(Json(updated))
}

/// POST /vehicle-types/{id}/toggle - Flips the active flag
#[utoipa::path(
    post,
    path = "/vehicle-types/{id}/toggle",
    params(("id" = String, Path, description = "Vehicle type id")),
    responses(
        (status = 200, description = "Active flag flipped"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown vehicle type")
    )
)]
pub async fn toggle_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(vehicle_type_id): Path<String>,
) -> Result<Json<VehicleType>, ApiError> {
    require_role(&user, ADMIN)?;
    let toggled = state
        .apply(|fleet| {
            let next = fleet.toggle_vehicle_type(&vehicle_type_id)?;
            let toggled = next.vehicle_type(&vehicle_type_id).cloned().ok_or_else(|| {
                fleet_core::FleetError::UnknownVehicleType(vehicle_type_id.clone())
            })?;
            Ok((next, toggled))
        })
        .await?;
    Ok(Json(toggled))
}

//=========================================================================================
// Dashboard
//=========================================================================================

/// One row of the fleet inventory table.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetRow {
    pub truck: Truck,
    pub site_name: Option<String>,
    pub vehicle_type_name: Option<String>,
    pub active_service: Option<ServiceRequest>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub summary: FleetSummary,
    pub fleet: Vec<FleetRow>,
}

/// GET /dashboard
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Fleet summary and inventory"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<DashboardResponse>, ApiError> {
    require_role(&user, STAFF)?;
    let fleet = state.snapshot().await;
    let rows = fleet
        .trucks
        .iter()
        .map(|truck| FleetRow {
            truck: truck.clone(),
            site_name: fleet.site(&truck.site_id).map(|s| s.name.clone()),
            vehicle_type_name: fleet
                .vehicle_type(&truck.vehicle_type_id)
                .map(|v| v.name.clone()),
            active_service: fleet.active_service_for(&truck.id).cloned(),
        })
        .collect();

    Ok(Json(DashboardResponse {
        summary: fleet.fleet_summary(),
        fleet: rows,
    }))
}
