//! crates/fleet_core/src/gateway.rs
//!
//! The persistence gateway. Every collection lives under its own key as one
//! JSON array; a read of an absent or unreadable key yields the seed data and
//! a save always rewrites the whole collection.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};

use crate::domain::{Booking, LogRecord, ServiceRequest, Site, Truck, User, VehicleType};
use crate::ports::{PortError, PortResult, StorageService};
use crate::seed;
use crate::state::FleetState;

/// Storage keys, one per collection.
pub mod keys {
    pub const SITES: &str = "kvr_sites";
    pub const TRUCKS: &str = "kvr_trucks";
    pub const RECORDS: &str = "kvr_records";
    pub const USER: &str = "kvr_user";
    pub const ALL_USERS: &str = "kvr_all_users";
    pub const BOOKINGS: &str = "kvr_bookings";
    pub const VEHICLE_TYPES: &str = "kvr_vehicle_types";
    pub const SERVICE_REQUESTS: &str = "kvr_service_requests";
}

#[derive(Clone)]
pub struct PersistenceGateway {
    storage: Arc<dyn StorageService>,
}

impl PersistenceGateway {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    async fn load<T: DeserializeOwned>(
        &self,
        key: &str,
        seed: fn() -> Vec<T>,
    ) -> PortResult<Vec<T>> {
        let Some(raw) = self.storage.read(key).await? else {
            return Ok(seed());
        };
        match serde_json::from_str(&raw) {
            Ok(collection) => Ok(collection),
            Err(e) => {
                warn!("Stored value under '{}' is unreadable ({}); using seed data.", key, e);
                Ok(seed())
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, collection: &[T]) -> PortResult<()> {
        self.storage.write(key, &encode(collection)?).await
    }

    //=====================================================================================
    // Per-collection accessors
    //=====================================================================================

    pub async fn get_sites(&self) -> PortResult<Vec<Site>> {
        self.load(keys::SITES, seed::sites).await
    }

    pub async fn save_sites(&self, sites: &[Site]) -> PortResult<()> {
        self.store(keys::SITES, sites).await
    }

    pub async fn get_trucks(&self) -> PortResult<Vec<Truck>> {
        self.load(keys::TRUCKS, seed::trucks).await
    }

    pub async fn save_trucks(&self, trucks: &[Truck]) -> PortResult<()> {
        self.store(keys::TRUCKS, trucks).await
    }

    pub async fn get_records(&self) -> PortResult<Vec<LogRecord>> {
        self.load(keys::RECORDS, seed::records).await
    }

    pub async fn save_records(&self, records: &[LogRecord]) -> PortResult<()> {
        self.store(keys::RECORDS, records).await
    }

    pub async fn get_users(&self) -> PortResult<Vec<User>> {
        self.load(keys::ALL_USERS, seed::users).await
    }

    pub async fn save_users(&self, users: &[User]) -> PortResult<()> {
        self.store(keys::ALL_USERS, users).await
    }

    pub async fn get_bookings(&self) -> PortResult<Vec<Booking>> {
        self.load(keys::BOOKINGS, Vec::new).await
    }

    pub async fn save_bookings(&self, bookings: &[Booking]) -> PortResult<()> {
        self.store(keys::BOOKINGS, bookings).await
    }

    pub async fn get_vehicle_types(&self) -> PortResult<Vec<VehicleType>> {
        self.load(keys::VEHICLE_TYPES, seed::vehicle_types).await
    }

    pub async fn save_vehicle_types(&self, vehicle_types: &[VehicleType]) -> PortResult<()> {
        self.store(keys::VEHICLE_TYPES, vehicle_types).await
    }

    pub async fn get_service_requests(&self) -> PortResult<Vec<ServiceRequest>> {
        self.load(keys::SERVICE_REQUESTS, Vec::new).await
    }

    pub async fn save_service_requests(&self, requests: &[ServiceRequest]) -> PortResult<()> {
        self.store(keys::SERVICE_REQUESTS, requests).await
    }

    //=====================================================================================
    // Current user
    //=====================================================================================

    pub async fn get_current_user(&self) -> PortResult<Option<User>> {
        let Some(raw) = self.storage.read(keys::USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Stored current user is unreadable ({}); treating as signed out.", e);
                Ok(None)
            }
        }
    }

    pub async fn set_current_user(&self, user: Option<&User>) -> PortResult<()> {
        match user {
            Some(user) => {
                let json =
                    serde_json::to_string(user).map_err(|e| PortError::Unexpected(e.to_string()))?;
                self.storage.write(keys::USER, &json).await
            }
            None => self.storage.remove(keys::USER).await,
        }
    }

    //=====================================================================================
    // Whole-state helpers
    //=====================================================================================

    pub async fn load_state(&self) -> PortResult<FleetState> {
        let state = FleetState {
            sites: self.get_sites().await?,
            trucks: self.get_trucks().await?,
            records: self.get_records().await?,
            users: self.get_users().await?,
            bookings: self.get_bookings().await?,
            vehicle_types: self.get_vehicle_types().await?,
            service_requests: self.get_service_requests().await?,
        };
        info!(
            sites = state.sites.len(),
            trucks = state.trucks.len(),
            bookings = state.bookings.len(),
            "Fleet state loaded."
        );
        Ok(state)
    }

    /// Rewrites every collection that differs between `previous` and `next`.
    ///
    /// Collections are written one key at a time. If a write fails, the keys
    /// already rewritten are restored from `previous` before the error is
    /// returned, so storage keeps describing one state or the other.
    pub async fn save_changes(&self, previous: &FleetState, next: &FleetState) -> PortResult<()> {
        let mut pending: Vec<(&'static str, String, String)> = Vec::new();
        if previous.sites != next.sites {
            pending.push((keys::SITES, encode(&previous.sites)?, encode(&next.sites)?));
        }
        if previous.trucks != next.trucks {
            pending.push((keys::TRUCKS, encode(&previous.trucks)?, encode(&next.trucks)?));
        }
        if previous.records != next.records {
            pending.push((keys::RECORDS, encode(&previous.records)?, encode(&next.records)?));
        }
        if previous.users != next.users {
            pending.push((keys::ALL_USERS, encode(&previous.users)?, encode(&next.users)?));
        }
        if previous.bookings != next.bookings {
            pending.push((keys::BOOKINGS, encode(&previous.bookings)?, encode(&next.bookings)?));
        }
        if previous.vehicle_types != next.vehicle_types {
            pending.push((
                keys::VEHICLE_TYPES,
                encode(&previous.vehicle_types)?,
                encode(&next.vehicle_types)?,
            ));
        }
        if previous.service_requests != next.service_requests {
            pending.push((
                keys::SERVICE_REQUESTS,
                encode(&previous.service_requests)?,
                encode(&next.service_requests)?,
            ));
        }

        for (done, (key, _, value)) in pending.iter().enumerate() {
            if let Err(e) = self.storage.write(key, value).await {
                warn!("Saving '{}' failed ({}); restoring {} collection(s).", key, e, done);
                for (written, old, _) in &pending[..done] {
                    if let Err(restore) = self.storage.write(written, old).await {
                        error!("Could not restore '{}': {}", written, restore);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

fn encode<T: Serialize>(collection: &[T]) -> PortResult<String> {
    serde_json::to_string(collection).map_err(|e| PortError::Unexpected(e.to_string()))
}
