//! Bookvault Book Catalog Service
//!
//! A small multi-user book catalog server: users register and log in with
//! password credentials, receive bearer tokens, and manage book records
//! they own. Records persist as one JSON file per collection.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
