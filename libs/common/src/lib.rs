//! Common library for the contact book backend
//!
//! This crate provides shared infrastructure used by the services: database
//! configuration, connection pooling, health checks, table bootstrap and the
//! storage error taxonomy.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, connect, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = connect(&config).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
