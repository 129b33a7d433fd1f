//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire service.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fleet_core::{FleetError, PortError};
use serde_json::json;
use tracing::error;

/// The primary error type for the `fleet_api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command on the fleet state was refused.
    #[error("{0}")]
    Fleet(#[from] FleetError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No user is signed in.
    #[error("Sign in required")]
    Unauthorized,

    /// The signed-in user's role may not perform this action.
    #[error("This action is not permitted for your role")]
    Forbidden,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Fleet(e) => match e {
                FleetError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                FleetError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                FleetError::DuplicateUser
                | FleetError::BookingNotSearching(_)
                | FleetError::TruckNotIdle(_)
                | FleetError::VehicleClassMismatch { .. }
                | FleetError::InvalidBookingTransition { .. }
                | FleetError::TruckCommitted { .. } => StatusCode::CONFLICT,
                FleetError::UnknownSite(_)
                | FleetError::UnknownTruck(_)
                | FleetError::UnknownBooking(_)
                | FleetError::UnknownVehicleType(_)
                | FleetError::UnknownServiceRequest(_)
                | FleetError::UnknownTask(_)
                | FleetError::UnknownRecord(_) => StatusCode::NOT_FOUND,
                FleetError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
                FleetError::Port(PortError::Unauthorized) => StatusCode::UNAUTHORIZED,
                FleetError::Port(PortError::Unexpected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::Unauthorized) | ApiError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
