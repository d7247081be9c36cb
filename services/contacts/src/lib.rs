//! Contact book service
//!
//! Authenticated callers manage personal contact records. Every store query
//! is scoped to the caller through [`repositories::OwnerScope`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
