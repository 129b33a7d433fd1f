//! crates/fleet_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the desk's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of where collections are stored and which AI provider answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

/// A string-keyed blob store, the way browser local storage is shaped.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the raw value under `key`, or `None` when nothing is stored.
    async fn read(&self, key: &str) -> PortResult<Option<String>>;

    /// Overwrites the value under `key`.
    async fn write(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removes the value under `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

//=========================================================================================
// Insight Port (external generative-AI collaborator)
//=========================================================================================

/// Selects the model/tool configuration used for one prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightMode {
    #[default]
    Standard,
    /// Extended reasoning before answering.
    Think,
    /// Web-grounded answer with citations.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightRequest {
    pub prompt: String,
    pub mode: InsightMode,
    pub system_instruction: String,
}

/// A grounding citation returned alongside a search-mode answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightReply {
    pub text: String,
    pub sources: Vec<Source>,
}

#[async_trait]
pub trait InsightService: Send + Sync {
    /// Sends one prompt and returns the generated text with any citations.
    async fn ask(&self, request: InsightRequest) -> PortResult<InsightReply>;
}
