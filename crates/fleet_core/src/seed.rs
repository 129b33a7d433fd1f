//! crates/fleet_core/src/seed.rs
//!
//! Default collections served when storage holds nothing for a key.

use chrono::Utc;

use crate::domain::{
    LogRecord, RecordType, Site, Truck, TruckStatus, User, UserRole, VehicleType,
};
use crate::state::FleetState;

pub fn sites() -> Vec<Site> {
    vec![
        site("site-1", "Vizag Smart City Project", "Visakhapatnam", 17.6868, 83.2185),
        site("site-2", "Hyderabad Metro Phase 2", "Hyderabad", 17.3850, 78.4867),
        site("site-3", "Amaravati Infra Development", "Vijayawada", 16.5062, 80.6480),
    ]
}

fn site(id: &str, name: &str, location: &str, lat: f64, lng: f64) -> Site {
    Site {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        lat,
        lng,
        queue: Vec::new(),
        productivity_score: 0.0,
        active_trips: 0,
    }
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "u1".to_string(),
            username: "admin".to_string(),
            full_name: "System Administrator".to_string(),
            email: "admin@kvrinfra.com".to_string(),
            password: Some("admin123".to_string()),
            role: UserRole::Admin,
            assigned_site_id: None,
        },
        User {
            id: "u2".to_string(),
            username: "op1".to_string(),
            full_name: "Site Operator 1".to_string(),
            email: "op1@kvrinfra.com".to_string(),
            password: Some("op123".to_string()),
            role: UserRole::Operator,
            assigned_site_id: Some("site-1".to_string()),
        },
    ]
}

pub fn vehicle_types() -> Vec<VehicleType> {
    vec![
        vehicle_type("v1", "Mini Truck", "1.5 Tons", "8ft x 5ft", 25.0, 150.0),
        vehicle_type("v2", "Tipper", "10 Tons", "16ft x 7ft", 45.0, 300.0),
        vehicle_type("v3", "Trailer", "25 Tons", "40ft x 8ft", 80.0, 500.0),
    ]
}

fn vehicle_type(
    id: &str,
    name: &str,
    capacity: &str,
    dimensions: &str,
    base_price_km: f64,
    waiting_charge_hr: f64,
) -> VehicleType {
    VehicleType {
        id: id.to_string(),
        name: name.to_string(),
        capacity: capacity.to_string(),
        dimensions: dimensions.to_string(),
        base_price_km,
        waiting_charge_hr,
        icon: "truck".to_string(),
        description: String::new(),
        is_active: true,
    }
}

pub fn trucks() -> Vec<Truck> {
    vec![
        truck("t1", "AP 31 TV 1234", "site-1", "v2", 92, "Suresh Kumar"),
        truck("t2", "TS 09 XY 5678", "site-1", "v2", 78, "Ramesh Babu"),
        truck("t3", "AP 16 AB 9012", "site-2", "v1", 85, "Anil Reddy"),
    ]
}

fn truck(
    id: &str,
    number: &str,
    site_id: &str,
    vehicle_type_id: &str,
    health_index: u8,
    driver: &str,
) -> Truck {
    Truck {
        id: id.to_string(),
        truck_number: number.to_string(),
        site_id: site_id.to_string(),
        vehicle_type_id: vehicle_type_id.to_string(),
        status: TruckStatus::Idle,
        fuel_level: 80,
        last_maintenance: "2024-01-15".to_string(),
        next_maintenance_in_km: 4200,
        health_index,
        driver_name: driver.to_string(),
        driver_phone: "9848000000".to_string(),
        eta: None,
    }
}

pub fn records() -> Vec<LogRecord> {
    let now = Utc::now();
    vec![
        LogRecord {
            id: "r1".to_string(),
            truck_id: "t1".to_string(),
            material: "Cement".to_string(),
            quantity: "20 Tons".to_string(),
            kind: RecordType::Loading,
            timestamp: now,
            gps: None,
            notes: None,
            pod_image_url: None,
        },
        LogRecord {
            id: "r2".to_string(),
            truck_id: "t1".to_string(),
            material: "Sand".to_string(),
            quantity: "15 Tons".to_string(),
            kind: RecordType::Unloading,
            timestamp: now,
            gps: None,
            notes: None,
            pod_image_url: None,
        },
    ]
}

/// The full seeded state, as a fresh install sees it.
pub fn state() -> FleetState {
    FleetState {
        sites: sites(),
        trucks: trucks(),
        records: records(),
        users: users(),
        bookings: Vec::new(),
        vehicle_types: vehicle_types(),
        service_requests: Vec::new(),
    }
}
