//! API handlers for Lendium REST endpoints

pub mod auth;
pub mod health;
pub mod items;
pub mod openapi;
pub mod transactions;
pub mod users;
