//! services/api/src/lib.rs
//!
//! The fleet desk HTTP service: storage and insight adapters, configuration,
//! and the axum web layer over `fleet_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
