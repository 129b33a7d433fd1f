//! crates/fleet_core/src/dispatch.rs
//!
//! Booking intake and the dispatch desk: binding a searching booking to an
//! idle truck of the requested vehicle class.

use chrono::Utc;
use tracing::info;

use crate::domain::{Booking, BookingStatus, NewBooking, Truck, TruckStatus, User};
use crate::error::{FleetError, FleetResult};
use crate::state::FleetState;

/// Distance used for quoting until real routing exists.
pub const QUOTE_DISTANCE_KM: f64 = 10.0;

impl FleetState {
    /// Quote for a booking of the given class. Unknown classes quote at zero.
    pub fn booking_price(&self, vehicle_type_id: &str) -> f64 {
        self.vehicle_type(vehicle_type_id)
            .map(|v| v.base_price_km * QUOTE_DISTANCE_KM)
            .unwrap_or(0.0)
    }

    /// Opens a booking in SEARCHING. A class that is no longer offered is
    /// refused; an unknown class is accepted and quoted at zero.
    pub fn create_booking(
        &self,
        customer: &User,
        new_booking: NewBooking,
    ) -> FleetResult<(Self, Booking)> {
        if let Some(class) = self.vehicle_type(&new_booking.vehicle_type_id) {
            if !class.is_active {
                return Err(FleetError::InvalidInput(format!(
                    "{} is not currently offered",
                    class.name
                )));
            }
        }

        let booking = Booking {
            id: format!("BK-{}", uuid::Uuid::new_v4().simple()),
            customer_id: customer.id.clone(),
            price: self.booking_price(&new_booking.vehicle_type_id),
            vehicle_type_id: new_booking.vehicle_type_id,
            truck_id: None,
            pickup: new_booking.pickup,
            drop: new_booking.drop,
            load_type: new_booking.load_type,
            weight: new_booking.weight,
            special_handling: new_booking.special_handling,
            notes: new_booking.notes,
            status: BookingStatus::Searching,
            timestamp: Utc::now(),
            driver_name: None,
            driver_phone: None,
            pod_url: None,
        };
        let mut next = self.clone();
        next.bookings.push(booking.clone());
        Ok((next, booking))
    }

    pub fn pending_bookings(&self) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Searching)
            .collect()
    }

    pub fn active_bookings(&self) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| !matches!(b.status, BookingStatus::Searching | BookingStatus::Completed))
            .collect()
    }

    /// The booking a truck is currently serving, if any.
    pub fn open_booking_for(&self, truck_id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| {
            b.truck_id.as_deref() == Some(truck_id)
                && !matches!(b.status, BookingStatus::Completed | BookingStatus::Cancelled)
        })
    }

    /// Idle trucks of exactly the requested class, in fleet order.
    pub fn available_trucks(&self, vehicle_type_id: &str) -> Vec<&Truck> {
        self.trucks
            .iter()
            .filter(|t| t.vehicle_type_id == vehicle_type_id && t.status == TruckStatus::Idle)
            .collect()
    }

    /// Candidates for a specific booking.
    pub fn candidates_for(&self, booking_id: &str) -> FleetResult<Vec<&Truck>> {
        let booking = self
            .booking(booking_id)
            .ok_or_else(|| FleetError::UnknownBooking(booking_id.to_string()))?;
        Ok(self.available_trucks(&booking.vehicle_type_id))
    }

    /// Assigns `truck_id` to `booking_id`.
    ///
    /// Booking, truck and site queue change together: every precondition is
    /// checked before the copy is touched, and the caller receives either the
    /// fully transitioned state or an error with `self` unchanged.
    pub fn assign(&self, booking_id: &str, truck_id: &str) -> FleetResult<Self> {
        let booking = self
            .booking(booking_id)
            .ok_or_else(|| FleetError::UnknownBooking(booking_id.to_string()))?;
        let truck = self
            .truck(truck_id)
            .ok_or_else(|| FleetError::UnknownTruck(truck_id.to_string()))?;

        if booking.status != BookingStatus::Searching {
            return Err(FleetError::BookingNotSearching(booking_id.to_string()));
        }
        if truck.status != TruckStatus::Idle {
            return Err(FleetError::TruckNotIdle(truck_id.to_string()));
        }
        if truck.vehicle_type_id != booking.vehicle_type_id {
            return Err(FleetError::VehicleClassMismatch {
                truck_id: truck_id.to_string(),
                vehicle_type_id: booking.vehicle_type_id.clone(),
            });
        }
        let site_id = truck.site_id.clone();
        if self.site(&site_id).is_none() {
            return Err(FleetError::UnknownSite(site_id));
        }

        let mut next = self.clone();
        for b in next.bookings.iter_mut().filter(|b| b.id == booking_id) {
            b.status = BookingStatus::Assigned;
            b.truck_id = Some(truck_id.to_string());
        }
        for t in next.trucks.iter_mut().filter(|t| t.id == truck_id) {
            t.status = TruckStatus::Assigned;
        }
        for s in next.sites.iter_mut().filter(|s| s.id == site_id) {
            s.queue.push(truck_id.to_string());
        }

        info!(booking_id, truck_id, site_id = %site_id, "Booking assigned.");
        Ok(next)
    }
}
