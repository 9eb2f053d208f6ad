//! Circulation server
//!
//! Borrow/return transaction engine for a lending library: items with finite
//! copy counts, holders with a bounded number of concurrent loans, and a REST
//! JSON API in front of both.

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
