pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, init_schema};
pub use error::{ImportError, Result};
pub use service::{ImportReconciler, MatchConfig};
