pub mod chat;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod ports;
pub mod seed;
pub mod service;
pub mod state;
pub mod view;

pub use chat::{ChatMessage, ChatRole, ChatSession};
pub use error::{FleetError, FleetResult};
pub use gateway::PersistenceGateway;
pub use ports::{
    InsightMode, InsightReply, InsightRequest, InsightService, PortError, PortResult, Source,
    StorageService,
};
pub use state::{FleetState, FleetSummary};
pub use view::{Navigator, View};
