//! crates/fleet_core/src/error.rs
//!
//! Domain failures raised by the state container commands.

use crate::domain::BookingStatus;
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username or email already exists")]
    DuplicateUser,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Site {0} not found")]
    UnknownSite(String),
    #[error("Truck {0} not found")]
    UnknownTruck(String),
    #[error("Booking {0} not found")]
    UnknownBooking(String),
    #[error("Vehicle type {0} not found")]
    UnknownVehicleType(String),
    #[error("Service request {0} not found")]
    UnknownServiceRequest(String),
    #[error("Task {0} not found")]
    UnknownTask(String),
    #[error("Record {0} not found")]
    UnknownRecord(String),
    #[error("Booking {0} is no longer searching for a vehicle")]
    BookingNotSearching(String),
    #[error("Truck {0} is not idle")]
    TruckNotIdle(String),
    #[error("Truck {truck_id} does not match requested vehicle class {vehicle_type_id}")]
    VehicleClassMismatch {
        truck_id: String,
        vehicle_type_id: String,
    },
    #[error("Booking {booking_id} cannot move from {from:?} to {to:?}")]
    InvalidBookingTransition {
        booking_id: String,
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Truck {truck_id} is committed to booking {booking_id}")]
    TruckCommitted {
        truck_id: String,
        booking_id: String,
    },
    #[error("Port error: {0}")]
    Port(#[from] PortError),
}

pub type FleetResult<T> = Result<T, FleetError>;
