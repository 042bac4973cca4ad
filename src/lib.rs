//! Mini Proxy - A forwarding HTTP proxy with an in-memory object cache
//!
//! Relays GET requests to origin servers and caches small responses so
//! repeat fetches are answered locally.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use state::AppState;
pub use tasks::spawn_report_task;
