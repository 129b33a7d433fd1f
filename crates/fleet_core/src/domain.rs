//! crates/fleet_core/src/domain.rs
//!
//! Defines the core data structures for the fleet desk.
//! Field names serialize in camelCase so stored collections keep the shape
//! the desk has always written. Fields that were added after the first stored
//! shape carry `#[serde(default)]` so older blobs still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Enumerations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Operator,
    Customer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    #[default]
    Idle,
    Loading,
    Transit,
    Maintenance,
    Assigned,
}

/// Lifecycle of a customer booking. Only `Searching -> Assigned` is driven by
/// the dispatch desk; the later states are set through whole-record updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Searching,
    Assigned,
    EnRoute,
    ArrivedPickup,
    Loading,
    InTransit,
    ArrivedDrop,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServicePriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialHandling {
    #[default]
    None,
    Fragile,
    Refrigerated,
    Hazardous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Loading,
    Unloading,
    Pod,
    Maintenance,
    Issue,
}

//=========================================================================================
// Entities
//=========================================================================================

/// A physical project/construction location that owns trucks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    /// Truck ids waiting at the site, in arrival order.
    #[serde(default)]
    pub queue: Vec<String>,
    #[serde(default)]
    pub productivity_score: f64,
    #[serde(default)]
    pub active_trips: u32,
}

/// A fleet vehicle stationed at a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: String,
    pub truck_number: String,
    pub site_id: String,
    #[serde(default)]
    pub vehicle_type_id: String,
    #[serde(default)]
    pub status: TruckStatus,
    /// Percentage, 0 to 100.
    #[serde(default)]
    pub fuel_level: u8,
    #[serde(default)]
    pub last_maintenance: String,
    #[serde(default)]
    pub next_maintenance_in_km: u32,
    /// Percentage, 0 to 100.
    #[serde(default)]
    pub health_index: u8,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
}

/// A catalog entry describing a class of vehicle a customer can book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub base_price_km: f64,
    #[serde(default)]
    pub waiting_charge_hr: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

/// A customer's transport request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub vehicle_type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_id: Option<String>,
    pub pickup: String,
    pub drop: String,
    #[serde(default)]
    pub load_type: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub special_handling: SpecialHandling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTask {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// A scheduled maintenance workflow for one truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: String,
    pub truck_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: ServicePriority,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub expected_date: String,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub tasks: Vec<ServiceTask>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// An append-only entry describing an event for a truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: String,
    pub truck_id: String,
    pub material: String,
    pub quantity: String,
    #[serde(rename = "type")]
    pub kind: RecordType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_image_url: Option<String>,
}

// Passwords are compared as plain strings; the desk has no credential hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_site_id: Option<String>,
}

//=========================================================================================
// Command payloads (entities before an id/timestamp is assigned)
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSite {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTruck {
    pub truck_number: String,
    pub site_id: String,
    pub vehicle_type_id: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Filled from the route when posted under a truck.
    #[serde(default)]
    pub truck_id: String,
    pub material: String,
    pub quantity: String,
    #[serde(rename = "type")]
    pub kind: RecordType,
    #[serde(default)]
    pub gps: Option<GeoPoint>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pod_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicleType {
    pub name: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub dimensions: String,
    pub base_price_km: f64,
    #[serde(default)]
    pub waiting_charge_hr: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub vehicle_type_id: String,
    pub pickup: String,
    pub drop: String,
    #[serde(default)]
    pub load_type: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub special_handling: SpecialHandling,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub truck_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: ServicePriority,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub expected_date: String,
    /// One task is created per description, all incomplete.
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub assigned_site_id: Option<String>,
}

/// Builds a fresh id with the given prefix, e.g. `site-3f1c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
