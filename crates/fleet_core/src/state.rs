//! crates/fleet_core/src/state.rs
//!
//! The application state container. `FleetState` holds every collection the
//! desk manages; commands never mutate in place but return the next state, so
//! a caller either adopts the whole transition or keeps the old state.

use chrono::Utc;
use serde::Serialize;

use crate::domain::{
    new_id, Booking, BookingStatus, LogRecord, NewRecord, NewSite, NewTruck, NewVehicleType,
    ServiceRequest, Site, Truck, TruckStatus, User, UserRole, VehicleType,
};
use crate::error::{FleetError, FleetResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetState {
    pub sites: Vec<Site>,
    pub trucks: Vec<Truck>,
    pub records: Vec<LogRecord>,
    pub users: Vec<User>,
    pub bookings: Vec<Booking>,
    pub vehicle_types: Vec<VehicleType>,
    pub service_requests: Vec<ServiceRequest>,
}

/// Headline numbers for the fleet dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub site_count: usize,
    pub truck_count: usize,
    pub average_health_index: u32,
}

impl FleetState {
    //=====================================================================================
    // Sites
    //=====================================================================================

    pub fn add_site(&self, new_site: NewSite) -> (Self, Site) {
        let site = Site {
            id: new_id("site"),
            name: new_site.name,
            location: new_site.location,
            lat: new_site.lat,
            lng: new_site.lng,
            queue: Vec::new(),
            productivity_score: 0.0,
            active_trips: 0,
        };
        let mut next = self.clone();
        next.sites.push(site.clone());
        (next, site)
    }

    pub fn update_site(&self, site: Site) -> FleetResult<Self> {
        let mut next = self.clone();
        let slot = next
            .sites
            .iter_mut()
            .find(|s| s.id == site.id)
            .ok_or_else(|| FleetError::UnknownSite(site.id.clone()))?;
        *slot = site;
        Ok(next)
    }

    /// Removes a site together with its trucks and their log records.
    /// Refused while one of those trucks is out on an open booking.
    pub fn delete_site(&self, site_id: &str) -> FleetResult<Self> {
        if !self.sites.iter().any(|s| s.id == site_id) {
            return Err(FleetError::UnknownSite(site_id.to_string()));
        }

        let doomed: Vec<&str> = self
            .trucks
            .iter()
            .filter(|t| t.site_id == site_id)
            .map(|t| t.id.as_str())
            .collect();
        for truck_id in &doomed {
            self.ensure_uncommitted(truck_id)?;
        }

        let mut next = self.clone();
        next.sites.retain(|s| s.id != site_id);
        next.trucks.retain(|t| t.site_id != site_id);
        next.records.retain(|r| !doomed.contains(&r.truck_id.as_str()));
        Ok(next)
    }

    /// Operators only see the site they are assigned to.
    pub fn visible_sites(&self, user: &User) -> Vec<&Site> {
        match (&user.role, &user.assigned_site_id) {
            (UserRole::Operator, Some(site_id)) => {
                self.sites.iter().filter(|s| &s.id == site_id).collect()
            }
            _ => self.sites.iter().collect(),
        }
    }

    pub fn site(&self, site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == site_id)
    }

    //=====================================================================================
    // Trucks
    //=====================================================================================

    pub fn add_truck(&self, new_truck: NewTruck) -> FleetResult<(Self, Truck)> {
        if self.site(&new_truck.site_id).is_none() {
            return Err(FleetError::UnknownSite(new_truck.site_id));
        }

        let truck = Truck {
            id: new_id("truck"),
            truck_number: new_truck.truck_number,
            site_id: new_truck.site_id,
            vehicle_type_id: new_truck.vehicle_type_id,
            status: TruckStatus::Idle,
            fuel_level: 100,
            last_maintenance: Utc::now().date_naive().to_string(),
            next_maintenance_in_km: 5000,
            health_index: 100,
            driver_name: new_truck.driver_name,
            driver_phone: new_truck.driver_phone,
            eta: None,
        };
        let mut next = self.clone();
        next.trucks.push(truck.clone());
        Ok((next, truck))
    }

    /// Whole-record replacement. Status is owned by dispatch while the truck
    /// serves an open booking, and only dispatch may mark a truck ASSIGNED.
    pub fn update_truck(&self, truck: Truck) -> FleetResult<Self> {
        let stored = self
            .truck(&truck.id)
            .ok_or_else(|| FleetError::UnknownTruck(truck.id.clone()))?;
        if self.site(&truck.site_id).is_none() {
            return Err(FleetError::UnknownSite(truck.site_id));
        }
        if truck.fuel_level > 100 || truck.health_index > 100 {
            return Err(FleetError::InvalidInput(
                "Fuel level and health index must be between 0 and 100".to_string(),
            ));
        }
        if truck.status != stored.status {
            self.ensure_uncommitted(&truck.id)?;
            if truck.status == TruckStatus::Assigned {
                return Err(FleetError::InvalidInput(
                    "Trucks are marked ASSIGNED only by dispatch".to_string(),
                ));
            }
        }

        let mut next = self.clone();
        let slot = next
            .trucks
            .iter_mut()
            .find(|t| t.id == truck.id)
            .ok_or_else(|| FleetError::UnknownTruck(truck.id.clone()))?;
        *slot = truck;
        Ok(next)
    }

    /// Removes a truck, every log record written for it and its place in
    /// site queues. Refused while the truck serves an open booking.
    pub fn delete_truck(&self, truck_id: &str) -> FleetResult<Self> {
        if self.truck(truck_id).is_none() {
            return Err(FleetError::UnknownTruck(truck_id.to_string()));
        }
        self.ensure_uncommitted(truck_id)?;

        let mut next = self.clone();
        next.trucks.retain(|t| t.id != truck_id);
        next.records.retain(|r| r.truck_id != truck_id);
        for site in next.sites.iter_mut() {
            site.queue.retain(|id| id != truck_id);
        }
        Ok(next)
    }

    fn ensure_uncommitted(&self, truck_id: &str) -> FleetResult<()> {
        match self.open_booking_for(truck_id) {
            Some(booking) => Err(FleetError::TruckCommitted {
                truck_id: truck_id.to_string(),
                booking_id: booking.id.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn truck(&self, truck_id: &str) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.id == truck_id)
    }

    pub fn trucks_at_site(&self, site_id: &str) -> Vec<&Truck> {
        self.trucks.iter().filter(|t| t.site_id == site_id).collect()
    }

    //=====================================================================================
    // Log records
    //=====================================================================================

    /// Newest records come first.
    pub fn add_record(&self, new_record: NewRecord) -> FleetResult<(Self, LogRecord)> {
        if self.truck(&new_record.truck_id).is_none() {
            return Err(FleetError::UnknownTruck(new_record.truck_id));
        }

        let record = LogRecord {
            id: new_id("record"),
            truck_id: new_record.truck_id,
            material: new_record.material,
            quantity: new_record.quantity,
            kind: new_record.kind,
            timestamp: Utc::now(),
            gps: new_record.gps,
            notes: new_record.notes,
            pod_image_url: new_record.pod_image_url,
        };
        let mut next = self.clone();
        next.records.insert(0, record.clone());
        Ok((next, record))
    }

    pub fn delete_record(&self, record_id: &str) -> FleetResult<Self> {
        if !self.records.iter().any(|r| r.id == record_id) {
            return Err(FleetError::UnknownRecord(record_id.to_string()));
        }
        let mut next = self.clone();
        next.records.retain(|r| r.id != record_id);
        Ok(next)
    }

    pub fn records_for_truck(&self, truck_id: &str) -> Vec<&LogRecord> {
        self.records.iter().filter(|r| r.truck_id == truck_id).collect()
    }

    //=====================================================================================
    // Vehicle catalog
    //=====================================================================================

    pub fn add_vehicle_type(&self, new_type: NewVehicleType) -> (Self, VehicleType) {
        let vehicle_type = VehicleType {
            id: new_id("v"),
            name: new_type.name,
            capacity: new_type.capacity,
            dimensions: new_type.dimensions,
            base_price_km: new_type.base_price_km,
            waiting_charge_hr: new_type.waiting_charge_hr,
            icon: new_type.icon,
            description: new_type.description,
            is_active: true,
        };
        let mut next = self.clone();
        next.vehicle_types.push(vehicle_type.clone());
        (next, vehicle_type)
    }

    pub fn update_vehicle_type(&self, vehicle_type: VehicleType) -> FleetResult<Self> {
        let mut next = self.clone();
        let slot = next
            .vehicle_types
            .iter_mut()
            .find(|v| v.id == vehicle_type.id)
            .ok_or_else(|| FleetError::UnknownVehicleType(vehicle_type.id.clone()))?;
        *slot = vehicle_type;
        Ok(next)
    }

    pub fn toggle_vehicle_type(&self, vehicle_type_id: &str) -> FleetResult<Self> {
        let mut next = self.clone();
        let slot = next
            .vehicle_types
            .iter_mut()
            .find(|v| v.id == vehicle_type_id)
            .ok_or_else(|| FleetError::UnknownVehicleType(vehicle_type_id.to_string()))?;
        slot.is_active = !slot.is_active;
        Ok(next)
    }

    pub fn vehicle_type(&self, vehicle_type_id: &str) -> Option<&VehicleType> {
        self.vehicle_types.iter().find(|v| v.id == vehicle_type_id)
    }

    /// Only active classes are offered to customers.
    pub fn active_vehicle_types(&self) -> Vec<&VehicleType> {
        self.vehicle_types.iter().filter(|v| v.is_active).collect()
    }

    //=====================================================================================
    // Bookings
    //=====================================================================================

    /// Whole-record update used to drive the later trip states.
    ///
    /// The truck binding, customer, price and creation time stay as stored;
    /// only dispatch sets them. A booking never returns to SEARCHING, and
    /// cannot move past SEARCHING without a truck (cancelling is allowed).
    pub fn update_booking(&self, booking: Booking) -> FleetResult<(Self, Booking)> {
        let stored = self
            .booking(&booking.id)
            .ok_or_else(|| FleetError::UnknownBooking(booking.id.clone()))?;

        let (from, to) = (stored.status, booking.status);
        let reopens = to == BookingStatus::Searching && from != BookingStatus::Searching;
        let needs_truck = !matches!(to, BookingStatus::Searching | BookingStatus::Cancelled);
        if reopens || (needs_truck && stored.truck_id.is_none()) {
            return Err(FleetError::InvalidBookingTransition {
                booking_id: booking.id,
                from,
                to,
            });
        }

        let updated = Booking {
            truck_id: stored.truck_id.clone(),
            customer_id: stored.customer_id.clone(),
            price: stored.price,
            timestamp: stored.timestamp,
            ..booking
        };
        let mut next = self.clone();
        if let Some(slot) = next.bookings.iter_mut().find(|b| b.id == updated.id) {
            *slot = updated.clone();
        }
        Ok((next, updated))
    }

    pub fn booking(&self, booking_id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == booking_id)
    }

    pub fn bookings_for_customer(&self, customer_id: &str) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.customer_id == customer_id)
            .collect()
    }

    //=====================================================================================
    // Dashboard
    //=====================================================================================

    pub fn fleet_summary(&self) -> FleetSummary {
        let total: u32 = self.trucks.iter().map(|t| u32::from(t.health_index)).sum();
        let count = self.trucks.len().max(1) as f64;
        FleetSummary {
            site_count: self.sites.len(),
            truck_count: self.trucks.len(),
            average_health_index: (f64::from(total) / count).round() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordType;
    use crate::seed;

    fn record(truck_id: &str) -> NewRecord {
        NewRecord {
            truck_id: truck_id.to_string(),
            material: "Gravel".to_string(),
            quantity: "12 Tons".to_string(),
            kind: RecordType::Loading,
            gps: None,
            notes: None,
            pod_image_url: None,
        }
    }

    #[test]
    fn deleting_site_without_trucks_touches_nothing_else() {
        let state = seed::state();
        let next = state.delete_site("site-3").unwrap();

        assert!(next.site("site-3").is_none());
        assert_eq!(next.sites.len(), state.sites.len() - 1);
        assert_eq!(next.trucks, state.trucks);
        assert_eq!(next.records, state.records);
        assert_eq!(next.users, state.users);
        assert_eq!(next.bookings, state.bookings);
    }

    #[test]
    fn deleting_site_cascades_to_trucks_and_their_records() {
        let state = seed::state();
        let (state, _) = state.add_record(record("t2")).unwrap();
        let (state, kept) = state.add_record(record("t3")).unwrap();

        let next = state.delete_site("site-1").unwrap();

        assert!(next.trucks.iter().all(|t| t.site_id != "site-1"));
        assert!(next.truck("t3").is_some());
        assert_eq!(next.records, vec![kept]);
    }

    #[test]
    fn deleting_unknown_site_is_rejected() {
        let state = seed::state();
        assert!(matches!(
            state.delete_site("site-404"),
            Err(FleetError::UnknownSite(_))
        ));
    }

    #[test]
    fn truck_needs_an_existing_site() {
        let state = seed::state();
        let result = state.add_truck(NewTruck {
            truck_number: "AP 00 ZZ 0000".to_string(),
            site_id: "nowhere".to_string(),
            vehicle_type_id: "v1".to_string(),
            driver_name: String::new(),
            driver_phone: String::new(),
        });
        assert!(matches!(result, Err(FleetError::UnknownSite(_))));
    }

    #[test]
    fn new_truck_starts_idle_at_its_site() {
        let state = seed::state();
        let (next, truck) = state
            .add_truck(NewTruck {
                truck_number: "AP 39 QQ 4321".to_string(),
                site_id: "site-2".to_string(),
                vehicle_type_id: "v2".to_string(),
                driver_name: "Ravi".to_string(),
                driver_phone: "9000000000".to_string(),
            })
            .unwrap();

        assert_eq!(truck.status, TruckStatus::Idle);
        assert!(truck.id.starts_with("truck-"));
        assert_eq!(next.trucks_at_site("site-2").len(), 2);
        assert_eq!(state.trucks_at_site("site-2").len(), 1);
    }

    #[test]
    fn deleting_truck_drops_its_records() {
        let state = seed::state();
        assert_eq!(state.records_for_truck("t1").len(), 2);

        let next = state.delete_truck("t1").unwrap();
        assert!(next.records_for_truck("t1").is_empty());
        assert_eq!(next.sites, state.sites);
    }

    #[test]
    fn records_are_prepended() {
        let state = seed::state();
        let (next, added) = state.add_record(record("t1")).unwrap();
        assert_eq!(next.records.first(), Some(&added));

        let next = next.delete_record(&added.id).unwrap();
        assert_eq!(next.records, state.records);
    }

    #[test]
    fn operator_sees_only_assigned_site() {
        let state = seed::state();
        let operator = state.users.iter().find(|u| u.username == "op1").unwrap();
        let admin = state.users.iter().find(|u| u.username == "admin").unwrap();

        let visible: Vec<&str> = state
            .visible_sites(operator)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(visible, vec!["site-1"]);
        assert_eq!(state.visible_sites(admin).len(), state.sites.len());
    }

    #[test]
    fn toggling_vehicle_type_hides_it_from_customers() {
        let state = seed::state();
        let before = state.active_vehicle_types().len();
        let next = state.toggle_vehicle_type("v1").unwrap();
        assert_eq!(next.active_vehicle_types().len(), before - 1);
        assert_eq!(next.toggle_vehicle_type("v1").unwrap(), state);
    }

    #[test]
    fn summary_of_empty_fleet_does_not_divide_by_zero() {
        let summary = FleetState::default().fleet_summary();
        assert_eq!(summary.truck_count, 0);
        assert_eq!(summary.average_health_index, 0);
    }

    #[test]
    fn summary_rounds_average_health() {
        let mut state = seed::state();
        state.trucks[0].health_index = 90;
        state.trucks[1].health_index = 85;
        state.trucks[2].health_index = 70;
        // (90 + 85 + 70) / 3 = 81.67
        assert_eq!(state.fleet_summary().average_health_index, 82);
    }
}
