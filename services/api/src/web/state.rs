//! services/api/src/web/state.rs
//!
//! Defines the shared application state: the single owner of the fleet
//! collections and the adapters that back them.

use crate::config::Config;
use crate::error::ApiError;
use fleet_core::{
    ChatSession, FleetError, FleetState, InsightService, PersistenceGateway, StorageService,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: PersistenceGateway,
    pub insight: Arc<dyn InsightService>,
    fleet: RwLock<FleetState>,
    /// The running insight conversation for the signed-in user.
    pub chat: Mutex<Option<ChatSession>>,
}

impl AppState {
    /// Loads every collection through the gateway and builds the state.
    pub async fn load(
        config: Arc<Config>,
        storage: Arc<dyn StorageService>,
        insight: Arc<dyn InsightService>,
    ) -> Result<Arc<Self>, ApiError> {
        let gateway = PersistenceGateway::new(storage);
        let fleet = gateway.load_state().await?;
        Ok(Arc::new(Self {
            config,
            gateway,
            insight,
            fleet: RwLock::new(fleet),
            chat: Mutex::new(None),
        }))
    }

    /// A consistent copy of the current collections.
    pub async fn snapshot(&self) -> FleetState {
        self.fleet.read().await.clone()
    }

    /// Runs one command against the fleet state.
    ///
    /// The write lock is held for the whole transition: the command computes
    /// the next state, changed collections are persisted, and only then is the
    /// next state adopted. A refused command or a failed save leaves the
    /// in-memory state as it was.
    pub async fn apply<T, F>(&self, command: F) -> Result<T, ApiError>
    where
        F: FnOnce(&FleetState) -> Result<(FleetState, T), FleetError>,
    {
        let mut fleet = self.fleet.write().await;
        let (next, output) = command(&*fleet)?;
        self.gateway.save_changes(&*fleet, &next).await?;
        *fleet = next;
        Ok(output)
    }

    /// Like [`AppState::apply`] for commands that only produce a new state.
    pub async fn apply_state<F>(&self, command: F) -> Result<(), ApiError>
    where
        F: FnOnce(&FleetState) -> Result<FleetState, FleetError>,
    {
        self.apply(|fleet| command(fleet).map(|next| (next, ())))
            .await
    }

    /// Drops any running insight conversation.
    pub async fn reset_chat(&self) {
        if self.chat.lock().await.take().is_some() {
            info!("Insight conversation reset.");
        }
    }
}
