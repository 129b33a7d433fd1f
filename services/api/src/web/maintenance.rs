//! services/api/src/web/maintenance.rs
//!
//! Service requests and their task checklists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use fleet_core::domain::{NewServiceRequest, ServiceRequest, User, UserRole};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::web::{middleware::require_role, state::AppState};

const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Operator];

/// A service request with its checklist progress.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestView {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub completion_percent: u8,
}

impl From<ServiceRequest> for ServiceRequestView {
    fn from(request: ServiceRequest) -> Self {
        Self {
            completion_percent: request.completion_percent(),
            request,
        }
    }
}

/// GET /service-requests
#[utoipa::path(
    get,
    path = "/service-requests",
    responses(
        (status = 200, description = "Service requests with completion"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only")
    )
)]
pub async fn list_service_requests_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ServiceRequestView>>, ApiError> {
    require_role(&user, STAFF)?;
    let fleet = state.snapshot().await;
    Ok(Json(
        fleet.service_requests.into_iter().map(Into::into).collect(),
    ))
}

/// POST /service-requests
#[utoipa::path(
    post,
    path = "/service-requests",
    request_body(
        content_type = "application/json",
        description = "Truck, service type, priority, cost, date and task descriptions."
    ),
    responses(
        (status = 201, description = "Service request opened in PENDING"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown truck")
    )
)]
pub async fn create_service_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new_request): Json<NewServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, STAFF)?;
    let request = state
        .apply(|fleet| fleet.create_service_request(new_request))
        .await?;
    info!(request_id = %request.id, truck_id = %request.truck_id, "Service scheduled.");
    Ok((
        StatusCode::CREATED,
        Json(ServiceRequestView::from(request)),
    ))
}

/// POST /service-requests/{id}/tasks/{taskId}/toggle
#[utoipa::path(
    post,
    path = "/service-requests/{id}/tasks/{task_id}/toggle",
    params(
        ("id" = String, Path, description = "Service request id"),
        ("task_id" = String, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "Task flipped and status settled"),
        (status = 401, description = "Nobody is signed in"),
        (status = 403, description = "Admins and operators only"),
        (status = 404, description = "Unknown service request or task")
    )
)]
pub async fn toggle_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path((request_id, task_id)): Path<(String, String)>,
) -> Result<Json<ServiceRequestView>, ApiError> {
    require_role(&user, STAFF)?;
    let request = state
        .apply(|fleet| {
            let next = fleet.toggle_task(&request_id, &task_id)?;
            let request = next.service_request(&request_id).cloned().ok_or_else(|| {
                fleet_core::FleetError::UnknownServiceRequest(request_id.clone())
            })?;
            Ok((next, request))
        })
        .await?;
    Ok(Json(request.into()))
}
