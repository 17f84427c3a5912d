//! Lendium Peer-to-Peer Lending Server
//!
//! A Rust implementation of the Lendium lending server, providing a REST
//! JSON API for registering users, listing items for lending, and driving
//! the borrow-transaction lifecycle (request, approve/reject,
//! cancel/return) with strict consistency between transactions and item
//! availability.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
