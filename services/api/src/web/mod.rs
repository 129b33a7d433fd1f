pub mod auth;
pub mod dispatch;
pub mod insights;
pub mod maintenance;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_login;
pub use state::AppState;

/// Builds every route of the desk. Auth routes are public; the rest require a
/// signed-in user.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler));

    let protected_routes = Router::new()
        .route(
            "/sites",
            get(rest::list_sites_handler).post(rest::add_site_handler),
        )
        .route(
            "/sites/{id}",
            put(rest::update_site_handler).delete(rest::delete_site_handler),
        )
        .route("/sites/{id}/trucks", get(rest::site_trucks_handler))
        .route(
            "/trucks",
            get(rest::list_trucks_handler).post(rest::add_truck_handler),
        )
        .route(
            "/trucks/{id}",
            put(rest::update_truck_handler).delete(rest::delete_truck_handler),
        )
        .route(
            "/trucks/{id}/records",
            get(rest::truck_records_handler).post(rest::add_record_handler),
        )
        .route("/records/{id}", delete(rest::delete_record_handler))
        .route(
            "/vehicle-types",
            get(rest::list_vehicle_types_handler).post(rest::add_vehicle_type_handler),
        )
        .route(
            "/vehicle-types/{id}",
            put(rest::update_vehicle_type_handler),
        )
        .route(
            "/vehicle-types/{id}/toggle",
            post(rest::toggle_vehicle_type_handler),
        )
        .route(
            "/bookings",
            get(dispatch::list_bookings_handler).post(dispatch::create_booking_handler),
        )
        .route("/bookings/{id}", put(dispatch::update_booking_handler))
        .route("/dispatch", get(dispatch::dispatch_board_handler))
        .route(
            "/dispatch/{booking_id}/candidates",
            get(dispatch::candidates_handler),
        )
        .route(
            "/dispatch/{booking_id}/assign",
            post(dispatch::assign_handler),
        )
        .route(
            "/service-requests",
            get(maintenance::list_service_requests_handler)
                .post(maintenance::create_service_request_handler),
        )
        .route(
            "/service-requests/{id}/tasks/{task_id}/toggle",
            post(maintenance::toggle_task_handler),
        )
        .route("/dashboard", get(rest::dashboard_handler))
        .route(
            "/insights",
            get(insights::history_handler).post(insights::ask_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_login,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
